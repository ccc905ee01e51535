//! Frames of the line-delimited JSON protocol spoken by `TcpTransport`.

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0.0";

pub const MSG_TYPE_SUBSCRIBE: &str = "subscribe";
pub const MSG_TYPE_SUBSCRIBE_ALL: &str = "subscribe_all";
pub const MSG_TYPE_SUBSCRIBE_SUCCESS: &str = "subscribe_success";
pub const MSG_TYPE_SUBSCRIBE_FAILED: &str = "subscribe_failed";
pub const MSG_TYPE_PUBLISH: &str = "publish";

#[derive(Serialize, Deserialize, Debug)]
pub struct MsgHeader {
  pub version: String,

  #[serde(rename = "type")]
  pub msgtype: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MsgSubscribe {
  pub version: String,

  #[serde(rename = "type")]
  pub msgtype: String,

  pub prefix: Vec<u8>,
}

impl MsgSubscribe {
  pub fn new(prefix: &[u8]) -> MsgSubscribe {
    MsgSubscribe {
      version: PROTOCOL_VERSION.to_string(),
      msgtype: MSG_TYPE_SUBSCRIBE.to_string(),
      prefix: prefix.to_vec(),
    }
  }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MsgSubscribeAll {
  pub version: String,

  #[serde(rename = "type")]
  pub msgtype: String,
}

impl MsgSubscribeAll {
  pub fn new() -> MsgSubscribeAll {
    MsgSubscribeAll {
      version: PROTOCOL_VERSION.to_string(),
      msgtype: MSG_TYPE_SUBSCRIBE_ALL.to_string(),
    }
  }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MsgSubscribeFailed {
  pub version: String,

  #[serde(rename = "type")]
  pub msgtype: String,

  pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MsgPublish {
  pub version: String,

  #[serde(rename = "type")]
  pub msgtype: String,

  pub data: Vec<u8>,
}

impl MsgPublish {
  pub fn new(data: &[u8]) -> MsgPublish {
    MsgPublish {
      version: PROTOCOL_VERSION.to_string(),
      msgtype: MSG_TYPE_PUBLISH.to_string(),
      data: data.to_vec(),
    }
  }
}
