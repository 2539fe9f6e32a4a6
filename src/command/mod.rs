//! Command parser and dispatcher: turns one received line into a mutation
//! of the room registry or credential store, or a chat fan-out, and writes
//! the user-facing reply frame(s) back through the [`Relay`].
//!
//! A single `dispatch` entry point takes connection-scoped state and a
//! borrowed line; there is no registry of pluggable handlers here, just
//! the six commands and the chat fallback the wire grammar defines.

use crate::error::CredentialError;
use crate::state::{ConnId, Relay, encode_frame};

/// The whitespace class used for tokenization: space, tab, vertical tab,
/// form feed, carriage return, newline.
fn is_command_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0B | 0x0C | b'\r' | b'\n')
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_ascii() && is_command_whitespace(c as u8))
        .filter(|tok| !tok.is_empty())
        .collect()
}

/// Dispatches one received line for `id`. `line` is the raw bytes of a
/// single `recv`, not yet validated as UTF-8 — non-UTF-8 bytes are replaced
/// per [`String::from_utf8_lossy`], matching the "treat as opaque text"
/// spirit of a byte-stream chat relay.
pub async fn dispatch(relay: &Relay, id: ConnId, line: &[u8]) {
    if line.first() == Some(&b'/') {
        let text = String::from_utf8_lossy(line);
        dispatch_command(relay, id, &text).await;
    } else {
        let text = String::from_utf8_lossy(line);
        dispatch_chat(relay, id, &text).await;
    }
}

async fn dispatch_command(relay: &Relay, id: ConnId, text: &str) {
    let mut tokens = tokenize(text).into_iter();
    let Some(command) = tokens.next() else {
        return;
    };

    match command {
        "/host" => {
            let Some(room) = tokens.next() else { return };
            let reply = match relay.rooms().host(id, room) {
                Ok(()) => format!("Created {room}\n"),
                Err(_) => format!("{room} exists already\n"),
            };
            reply_to(relay, id, &reply).await;
        }
        "/join" => {
            let Some(room) = tokens.next() else { return };
            let reply = match relay.rooms().join(id, room) {
                Ok(()) => format!("Joined {room}\n"),
                Err(_) => format!("{room} does not exist\n"),
            };
            reply_to(relay, id, &reply).await;
        }
        "/leave" => {
            // Capture the prior room name before leave() clears it; leave()
            // itself only reports whether a departure happened.
            let prior = relay.rooms().room_of(id);
            match relay.rooms().leave(id) {
                Ok(true) => {
                    let room = prior.unwrap_or_default();
                    reply_to(relay, id, &format!("Left {room}\n")).await;
                }
                Ok(false) => {
                    reply_to(relay, id, "User is not in a room\n").await;
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "leave on unregistered connection");
                }
            }
        }
        "/create" => {
            let (Some(user), Some(pass)) = (tokens.next(), tokens.next()) else {
                return;
            };
            let reply = match relay.credentials().create(user, pass).await {
                Ok(()) => format!("Created account {user}\n"),
                Err(CredentialError::Db(e)) => {
                    tracing::warn!(id, error = %e, "credential store error on create");
                    "Username exists already.\n".to_string()
                }
                Err(_) => "Username exists already.\n".to_string(),
            };
            reply_to(relay, id, &reply).await;
        }
        "/login" => {
            let (Some(user), Some(pass)) = (tokens.next(), tokens.next()) else {
                return;
            };
            let reply = match relay.credentials().login(id, user, pass).await {
                Ok(()) => format!("Logged in as {user}\n"),
                Err(CredentialError::Db(e)) => {
                    tracing::warn!(id, error = %e, "credential store error on login");
                    "Wrong username/password.\n".to_string()
                }
                Err(_) => "Wrong username/password.\n".to_string(),
            };
            reply_to(relay, id, &reply).await;
        }
        "/logout" => match relay.credentials().logout(id) {
            Ok(()) => reply_to(relay, id, "Logged out\n").await,
            Err(e) => tracing::warn!(id, error = %e, "logout on unregistered connection"),
        },
        _ => {
            reply_to(relay, id, "Unknown command\n").await;
        }
    }
}

async fn dispatch_chat(relay: &Relay, id: ConnId, text: &str) {
    let members = relay.rooms().members_of(id);
    let name = relay.credentials().name_of(id).ok().flatten();

    let composed = match name {
        Some(username) => format!("{username}: {text}"),
        None => format!("Guest {id}: {text}"),
    };
    let frame = encode_frame(&composed);

    if members.is_empty() {
        // No room: echo to the sender only.
        relay.send_to(id, frame).await;
    } else {
        for member in members {
            relay.send_to(member, frame).await;
        }
    }
}

async fn reply_to(relay: &Relay, id: ConnId, text: &str) {
    relay.send_to(id, encode_frame(text)).await;
}
