//! Minimal demo consumer: polls `/consume` from a fixed offset, printing new
//! messages as they arrive.

use std::env;
use std::time::Duration;

use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let broker = args.next().expect("usage: consumer <broker host:port> <topic>");
    let topic = args.next().expect("missing <topic>");

    let client = reqwest::Client::new();
    let mut next_offset: u64 = 1;

    loop {
        let url = format!("http://{broker}/consume?topic={topic}&offset={next_offset}");
        let resp: Value = client.get(url).send().await?.json().await?;
        if let Some(messages) = resp.get("messages").and_then(Value::as_array) {
            if messages.is_empty() {
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
            for message in messages {
                println!("{message}");
                if let Some(offset) = message.get("offset").and_then(Value::as_u64) {
                    next_offset = offset + 1;
                }
            }
        } else {
            println!("error response: {resp}");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}
