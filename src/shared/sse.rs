use actix_web_lab::sse;
use serde::Serialize;

/// Named server-sent event carrying `payload` as JSON.
pub fn json_event<T: Serialize>(
  name: &'static str,
  payload: &T,
) -> Result<sse::Event, serde_json::Error> {
  sse::Data::new_json(payload).map(|data| sse::Event::from(data.event(name)))
}
