//! MQTT client for receiving driver commands
//!
//! Connects to an MQTT broker and subscribes to a topic. Each payload is a
//! JSON command object or a text command line (see [`crate::control`]);
//! parsed commands are forwarded to the main loop.

use crate::control::parse_message;
use crate::driver::Command;
use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "mobius";
const CLIENT_ID: &str = "mobius";

/// Decode one publish payload into a command
pub fn decode_payload(payload: &[u8]) -> Option<Command> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    parse_message(text)
}

/// MQTT client that receives commands in a background thread
pub struct MqttClient {
    receiver: Receiver<Command>,
    _thread: thread::JoinHandle<()>,
}

impl MqttClient {
    /// Create a new MQTT client and connect to the broker.
    /// Fails immediately if connection cannot be established.
    pub fn new(host: &str, port: u16, topic: &str) -> Result<Self, String> {
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new(CLIENT_ID, host, port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| format!("Failed to subscribe to topic '{}': {}", topic, e))?;

        // Test connection by polling once - fail fast if broker unreachable
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - {}",
                    host, port, e
                ));
            },
            None => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - connection closed",
                    host, port
                ));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::spawn(move || {
            // The client must outlive the event loop or the connection drops
            let _client = client;
            Self::message_loop(connection, sender, &topic_owned);
        });

        log::info!("MQTT: Connected to {}:{}, subscribed to '{}'", host, port, topic);

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: rumqttc::Connection, sender: Sender<Command>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic != topic {
                        continue;
                    }
                    match decode_payload(&publish.payload) {
                        Some(command) => {
                            log::info!("MQTT command: {:?}", command);
                            if sender.send(command).is_err() {
                                // Main thread gone, exit
                                break;
                            }
                        },
                        None => log::warn!("MQTT: ignoring payload on '{}'", topic),
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    log::error!("MQTT error: {}", e);
                    // Continue trying - connection may recover
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
    }

    /// Drain every pending command (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;

    #[test]
    fn test_decode_text_payload() {
        assert_eq!(decode_payload(b"  pause\n"), Some(Command::TogglePause));
        assert_eq!(
            decode_payload(b"3"),
            Some(Command::SelectColor { mode: ColorMode::Synthwave })
        );
    }

    #[test]
    fn test_decode_json_payload() {
        assert_eq!(
            decode_payload(br#"{"command":"drag_move","dx":10,"dy":-5}"#),
            Some(Command::DragMove { dx: 10.0, dy: -5.0 })
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_payload(b""), None);
        assert_eq!(decode_payload(b"   "), None);
        assert_eq!(decode_payload(&[0xff, 0xfe]), None);
        assert_eq!(decode_payload(b"launch"), None);
    }
}
