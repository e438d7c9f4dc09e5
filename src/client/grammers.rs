//! MTProto client implementation over grammers
//!
//! Owns the session lifecycle (connect, interactive first-time login, session
//! persistence) and translates grammers types and RPC errors into the crate's
//! boundary types. FLOOD_WAIT and account-ban signals are mapped here, once,
//! so the scraping core never inspects platform errors.

use crate::config::TelegramConfig;
use crate::errors::ScrapeError;
use crate::logger::{self, LogTag};
use crate::paths;
use crate::scraper::types::ChannelIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grammers_client::types::{Chat, Downloadable, Media, Message};
use grammers_client::{Client, Config as ClientConfig, InitParams, InvocationError, SignInError};
use grammers_session::{PackedChat, Session};
use grammers_tl_types as tl;
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use super::{Attachment, RawMessage, TelegramApi};

/// Production Telegram client
///
/// Chats are cached packed so history pages don't re-resolve the channel;
/// media handles are cached per fetched page so a download request for a
/// message id can be served without refetching the message.
pub struct GrammersApi {
    client: Client,
    chats: Mutex<HashMap<i64, PackedChat>>,
    media: Mutex<HashMap<i64, Media>>,
}

/// Connect to Telegram and ensure the session is authorized
///
/// On an unauthorized session this performs the interactive challenge:
/// request a one-time code for the phone number, read the code from stdin,
/// and if the account has two-step verification, submit the second secret.
/// The authorized session is persisted so subsequent runs skip all of this.
pub async fn connect_and_authorize(cfg: &TelegramConfig) -> Result<GrammersApi, ScrapeError> {
    if cfg.api_id == 0 || cfg.api_hash.is_empty() {
        return Err(ScrapeError::auth(
            "api_id / api_hash are not configured (config.toml or TELEGRAM_API_ID / TELEGRAM_API_HASH)",
        ));
    }

    let session_path = paths::get_session_path(&cfg.session_file);
    let session = Session::load_file_or_create(&session_path).map_err(|e| {
        ScrapeError::auth(format!(
            "Failed to load session file '{}': {}",
            session_path.display(),
            e
        ))
    })?;

    logger::info(LogTag::Auth, "Connecting to Telegram...");
    let client = Client::connect(ClientConfig {
        session,
        api_id: cfg.api_id,
        api_hash: cfg.api_hash.clone(),
        params: client_params(),
    })
    .await
    .map_err(|e| auth_error_from(format!("Failed to connect: {}", e)))?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(map_invocation_error)?;

    if !authorized {
        logger::info(
            LogTag::Auth,
            "Session not authorized, starting interactive login",
        );

        let phone = if !cfg.phone_number.is_empty() {
            cfg.phone_number.clone()
        } else {
            prompt("Enter your phone number (e.g. +2519...): ")?
        };

        let token = client
            .request_login_code(&phone)
            .await
            .map_err(|e| auth_error_from(format!("Failed to request login code: {}", e)))?;

        // Pause between code request and entry, like a person would
        let pause = rand::thread_rng().gen_range(2.0..5.0);
        tokio::time::sleep(Duration::from_secs_f64(pause)).await;

        let code = prompt("Enter the code: ")?;
        match client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = if !cfg.password.is_empty() {
                    cfg.password.clone()
                } else {
                    prompt("Two-step verification enabled. Enter your password: ")?
                };
                client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| auth_error_from(format!("Password check failed: {}", e)))?;
            }
            Err(e) => {
                return Err(auth_error_from(format!("Sign-in failed: {}", e)));
            }
        }

        client.session().save_to_file(&session_path).map_err(|e| {
            ScrapeError::auth(format!(
                "Failed to persist session to '{}': {}",
                session_path.display(),
                e
            ))
        })?;
        logger::info(LogTag::Auth, "Login successful, session persisted");
    } else {
        logger::info(LogTag::Auth, "Existing session is authorized");
    }

    Ok(GrammersApi {
        client,
        chats: Mutex::new(HashMap::new()),
        media: Mutex::new(HashMap::new()),
    })
}

#[async_trait]
impl TelegramApi for GrammersApi {
    async fn resolve_channel(&self, target: &str) -> Result<ChannelIdentity, ScrapeError> {
        let handle = extract_handle(target);
        if handle.is_empty() {
            return Err(ScrapeError::resolution(target, "empty channel reference"));
        }

        let chat = self
            .client
            .resolve_username(&handle)
            .await
            .map_err(|e| match map_invocation_error(e) {
                fatal @ ScrapeError::AccountBanned { .. } => fatal,
                flood @ ScrapeError::FloodWait { .. } => flood,
                other => ScrapeError::resolution(target, other.to_string()),
            })?
            .ok_or_else(|| ScrapeError::resolution(target, "no such channel"))?;

        let identity = identity_from_chat(&chat);
        if let Ok(mut chats) = self.chats.lock() {
            chats.insert(identity.id, chat.pack());
        }
        Ok(identity)
    }

    async fn fetch_history(
        &self,
        channel: &ChannelIdentity,
        offset_id: i64,
        limit: usize,
    ) -> Result<Vec<RawMessage>, ScrapeError> {
        let packed = self
            .chats
            .lock()
            .ok()
            .and_then(|chats| chats.get(&channel.id).copied())
            .ok_or_else(|| {
                ScrapeError::resolution(&channel.title, "channel was never resolved in this run")
            })?;

        // Media handles from the previous page are no longer reachable
        if let Ok(mut media) = self.media.lock() {
            media.clear();
        }

        let mut iter = self.client.iter_messages(packed).limit(limit);
        if offset_id > 0 {
            iter = iter.offset_id(offset_id as i32);
        }

        let mut page = Vec::with_capacity(limit);
        while let Some(message) = iter.next().await.map_err(map_invocation_error)? {
            if let Some(media) = message.media() {
                if let Ok(mut cache) = self.media.lock() {
                    cache.insert(message.raw.id as i64, media);
                }
            }
            page.push(normalize_message(&message));
            if page.len() >= limit {
                break;
            }
        }

        Ok(page)
    }

    async fn download_media(
        &self,
        _channel: &ChannelIdentity,
        message: &RawMessage,
        dest: &Path,
    ) -> Result<(), ScrapeError> {
        let media = self
            .media
            .lock()
            .ok()
            .and_then(|cache| cache.get(&message.id).cloned())
            .ok_or_else(|| {
                ScrapeError::download(message.id, "no media handle cached for this message")
            })?;

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            ScrapeError::storage(dest.display().to_string(), e.to_string())
        })?;

        let mut download = self.client.iter_download(&Downloadable::Media(media));
        while let Some(chunk) = download.next().await.map_err(map_invocation_error)? {
            file.write_all(&chunk).await.map_err(|e| {
                ScrapeError::storage(dest.display().to_string(), e.to_string())
            })?;
        }
        file.flush().await.map_err(|e| {
            ScrapeError::storage(dest.display().to_string(), e.to_string())
        })?;

        Ok(())
    }
}

/// Connection parameters
///
/// `flood_sleep_threshold: 0` stops grammers from sleeping through short
/// FLOOD_WAITs itself; every throttle must surface as an RPC error so it
/// reaches the delay policy (safety buffer, channel status, stats) instead
/// of a silent in-client retry.
fn client_params() -> InitParams {
    InitParams {
        flood_sleep_threshold: 0,
        ..InitParams::default()
    }
}

/// Strip URL prefixes and the @ sigil from a channel reference
fn extract_handle(target: &str) -> String {
    let trimmed = target.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let without_host = without_scheme
        .strip_prefix("t.me/")
        .or_else(|| without_scheme.strip_prefix("telegram.me/"))
        .unwrap_or(without_scheme);
    without_host
        .trim_start_matches('@')
        .trim_end_matches('/')
        .to_string()
}

fn identity_from_chat(chat: &Chat) -> ChannelIdentity {
    ChannelIdentity {
        id: chat.id(),
        title: chat.name().to_string(),
        username: chat.username().map(|u| u.to_string()),
    }
}

/// Normalize one grammers message into the boundary type
///
/// The attachment shape is decided here, once; downstream code only ever sees
/// the tagged union. The raw snapshot is a shallow copy of the platform
/// fields, carried through unvalidated.
fn normalize_message(message: &Message) -> RawMessage {
    let raw = &message.raw;

    let (sender_id, sender_kind) = match raw.from_id.as_ref().unwrap_or(&raw.peer_id) {
        tl::enums::Peer::User(u) => (Some(u.user_id), Some("user".to_string())),
        tl::enums::Peer::Chat(c) => (Some(c.chat_id), Some("chat".to_string())),
        tl::enums::Peer::Channel(c) => (Some(c.channel_id), Some("channel".to_string())),
    };

    let replies = raw.replies.as_ref().map(|r| {
        let tl::enums::MessageReplies::Replies(r) = r;
        r.replies
    });

    let attachment = match message.media() {
        Some(media) => classify_media(&media),
        None => Attachment::None,
    };

    let date = DateTime::<Utc>::from_timestamp(raw.date as i64, 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let text = if raw.message.is_empty() {
        None
    } else {
        Some(raw.message.clone())
    };

    let raw_snapshot = json!({
        "id": raw.id,
        "date": raw.date,
        "message": raw.message,
        "views": raw.views,
        "forwards": raw.forwards,
        "replies": replies,
        "grouped_id": raw.grouped_id,
        "post": raw.post,
        "post_author": raw.post_author,
        "from_id": sender_id,
        "sender_kind": sender_kind,
        "has_media": raw.media.is_some(),
    });

    RawMessage {
        id: raw.id as i64,
        sender_id,
        sender_kind,
        date,
        text,
        views: raw.views,
        forwards: raw.forwards,
        replies,
        grouped_id: raw.grouped_id,
        post_author: raw.post_author.clone(),
        is_post: raw.post,
        attachment,
        raw: raw_snapshot,
    }
}

/// Decide the attachment shape from the grammers media enum
fn classify_media(media: &Media) -> Attachment {
    match media {
        Media::Photo(_) => Attachment::Photo,
        Media::Document(document) => {
            let mime = document.mime_type().unwrap_or("");
            if mime.starts_with("image/") {
                let name = document.name();
                Attachment::DocumentImage {
                    mime_type: mime.to_string(),
                    file_name: if name.is_empty() {
                        None
                    } else {
                        Some(name.to_string())
                    },
                }
            } else {
                Attachment::Other
            }
        }
        _ => Attachment::Other,
    }
}

/// Translate grammers RPC failures into the crate's error taxonomy
fn map_invocation_error(err: InvocationError) -> ScrapeError {
    match &err {
        InvocationError::Rpc(rpc) => {
            if rpc.name == "FLOOD_WAIT" || rpc.name == "FLOOD_PREMIUM_WAIT" {
                return ScrapeError::FloodWait {
                    seconds: rpc.value.unwrap_or(0) as u64,
                };
            }
            if rpc.name == "PHONE_NUMBER_BANNED" || rpc.name.starts_with("USER_DEACTIVATED") {
                return ScrapeError::banned(rpc.to_string());
            }
            ScrapeError::generic(format!("RPC error: {}", rpc))
        }
        _ => ScrapeError::generic(err.to_string()),
    }
}

/// Classify auth-path failures rendered to a string
///
/// Auth calls surface several error types; a ban must stay fatal even when it
/// arrives through one of them.
fn auth_error_from(display: String) -> ScrapeError {
    if display.contains("PHONE_NUMBER_BANNED") || display.contains("USER_DEACTIVATED") {
        ScrapeError::banned(display)
    } else {
        ScrapeError::auth(display)
    }
}

/// Blocking stdin prompt for the interactive login challenge
fn prompt(message: &str) -> Result<String, ScrapeError> {
    use std::io::{self, Write};

    print!("{}", message);
    io::stdout()
        .flush()
        .map_err(|e| ScrapeError::auth(format!("stdout unavailable: {}", e)))?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| ScrapeError::auth(format!("stdin unavailable: {}", e)))?;

    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::{client_params, extract_handle};

    #[test]
    fn client_never_absorbs_throttles_internally() {
        assert_eq!(client_params().flood_sleep_threshold, 0);
    }

    #[test]
    fn handle_extraction_accepts_urls_and_sigils() {
        assert_eq!(extract_handle("https://t.me/chemed_chem"), "chemed_chem");
        assert_eq!(extract_handle("http://t.me/tikvahpharma/"), "tikvahpharma");
        assert_eq!(extract_handle("@lobelia4cosmetics"), "lobelia4cosmetics");
        assert_eq!(extract_handle("  plainhandle "), "plainhandle");
        assert_eq!(extract_handle(""), "");
    }
}
