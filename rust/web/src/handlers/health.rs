use chrono::{DateTime, Utc};
use serde::Serialize;
use warp::reply::Json;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    uptime_seconds: i64,
    started_at: String,
}

pub fn health(started_at: DateTime<Utc>) -> Json {
    let uptime = Utc::now().signed_duration_since(started_at);
    warp::reply::json(&HealthBody {
        status: "ok",
        uptime_seconds: uptime.num_seconds().max(0),
        started_at: started_at.to_rfc3339(),
    })
}
