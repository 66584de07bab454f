//! Route-planning prompt construction
//!
//! The prompt lists the waypoints in order and embeds an example of the JSON
//! shape we want back. The LLM does not always comply, which is why the parser
//! is tolerant.

use super::Waypoint;

/// Separator between waypoint names inside the (Japanese) prompt
pub const WAYPOINT_SEPARATOR: &str = "、";

/// Example output shape embedded in every route prompt
const ITINERARY_SCHEMA_EXAMPLE: &str = r#"{
  "start": "出発地点名",
  "route": [
    {
      "destination": "観光地名",
      "transport": "交通手段（車、電車、バス、徒歩など）",
      "distance": "次の目的地までの距離（km）",
      "time_required": "次の目的地までの所要時間（分）",
      "stay_duration": "この場所での滞在時間（分）"
    }
  ],
  "end": "到着地点名",
  "total_distance": "全体の移動距離（km）",
  "total_time": "全体の移動時間（分）"
}"#;

/// Build the route-planning prompt for the given waypoints
///
/// Waypoint names appear verbatim and in their given order. An empty slice
/// still produces a prompt; rejecting empty input is the caller's job.
pub fn build_route_prompt(waypoints: &[Waypoint]) -> String {
    let joined = waypoints
        .iter()
        .map(Waypoint::name)
        .collect::<Vec<_>>()
        .join(WAYPOINT_SEPARATOR);

    format!(
        "次の観光地を回る最適なルートを提案してください: {joined}。\
         各観光地の位置情報（緯度・経度）、交通手段、距離・所要時間、滞在時間を考慮して、\
         最適なルートをJSON形式で返してください。\
         距離はkm、時間は分の数値で記入してください。\
         JSON以外の文章は出力せず、以下の形式で出力してください。\n\n\
         {ITINERARY_SCHEMA_EXAMPLE}"
    )
}
