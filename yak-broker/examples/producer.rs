//! Minimal demo producer: discovers the leader via `/metadata/leader`, posts
//! one message to `/produce`, and follows a single redirect if told to.

use std::env;

use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let brokers_arg = args.next().expect("usage: producer <brokers host:port,...> <topic> <message>");
    let topic = args.next().expect("missing <topic>");
    let message = args.next().expect("missing <message>");

    let brokers: Vec<&str> = brokers_arg.split(',').map(str::trim).collect();
    let client = reqwest::Client::new();

    let mut leader = discover_leader(&client, &brokers).await.unwrap_or_else(|| brokers[0].to_string());

    for attempt in 1..=5 {
        println!("[try {attempt}] sending to {leader}");
        let resp: Value = client
            .post(format!("http://{leader}/produce"))
            .json(&json!({"topic": topic, "msg": message}))
            .send()
            .await?
            .json()
            .await?;
        match resp.get("status").and_then(Value::as_str) {
            Some("ok") => {
                println!("delivered: {resp}");
                return Ok(());
            }
            Some("redirect") => {
                if let Some(new_leader) = leader_from(&resp) {
                    println!("redirected to {new_leader}");
                    leader = new_leader;
                    continue;
                }
            }
            _ => println!("unexpected response: {resp}"),
        }
    }
    anyhow::bail!("could not deliver message after retries")
}

async fn discover_leader(client: &reqwest::Client, brokers: &[&str]) -> Option<String> {
    for broker in brokers {
        let Ok(resp) = client.get(format!("http://{broker}/metadata/leader")).send().await else {
            continue;
        };
        let Ok(body) = resp.json::<Value>().await else { continue };
        if let Some(leader) = leader_from(&body) {
            return Some(leader);
        }
    }
    None
}

fn leader_from(body: &Value) -> Option<String> {
    let leader = body.get("leader")?;
    let host = leader.get("host")?.as_str()?;
    let port = leader.get("port")?.as_u64()?;
    Some(format!("{host}:{port}"))
}
