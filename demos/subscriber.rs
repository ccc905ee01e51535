use anyhow::Result;
use pssub::{BlockingSubscriber, SubscriberClient, TopicFilter, DEFAULT_ENDPOINT};

fn main() -> Result<()> {
  env_logger::init();

  let mut args = std::env::args().skip(1);
  let filter = args.next().unwrap_or_default();
  let endpoint = args.next().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

  let filter = TopicFilter::from(filter.as_str());
  println!("Connecting to server {} subscribing for: {}", endpoint, filter);

  let mut subscriber = BlockingSubscriber::new(SubscriberClient::tcp(&endpoint, filter)?);
  subscriber.start_with_retry()?;

  for msg in subscriber {
    let msg = msg?;
    println!("{}\n", String::from_utf8_lossy(msg.as_bytes()));
  }
  Ok(())
}
