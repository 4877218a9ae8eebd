//! Phone verification: a short-lived code stored in a TTL cache keyed by
//! `(user, phone number)` and delivered over SMS. The cache and the SMS
//! provider are collaborators behind traits; this service only contracts
//! their interfaces.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

/// How long a verification code stays redeemable.
const CODE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("Failed to send verification code: {0}")]
    Sms(#[from] SmsError),
    #[error("Incorrect verification code")]
    CodeMismatch,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SmsError(pub String);

/// TTL key-value store for verification codes. The store owns expiry;
/// `get` never returns a value past its deadline.
#[async_trait]
pub(crate) trait VerificationStore: Send + Sync {
    async fn set(&self, key: String, value: String, ttl: Duration);
    async fn get(&self, key: &str) -> Option<String>;
    async fn delete(&self, key: &str);
}

/// In-process store. Entries are dropped lazily on read.
#[derive(Default)]
pub(crate) struct InMemoryVerificationStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

#[async_trait]
impl VerificationStore for InMemoryVerificationStore {
    async fn set(&self, key: String, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(key, (value, Instant::now() + ttl));
    }

    async fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, deadline)) if *deadline > Instant::now() => {
                    return Some(value.clone())
                }
                None => return None,
                Some(_) => {}
            }
        }
        // expired entry; drop it
        let mut entries = self.entries.write().await;
        entries.remove(key);
        None
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }
}

#[async_trait]
pub(crate) trait SmsSender: Send + Sync {
    /// Sends one message, returning the provider's delivery id. Failures
    /// are not retried here.
    async fn send(&self, phone_number: &str, message: &str) -> Result<String, SmsError>;
}

/// Twilio Messages API sender.
pub(crate) struct TwilioSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSender {
    pub(crate) fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

#[async_trait]
impl SmsSender for TwilioSender {
    async fn send(&self, phone_number: &str, message: &str) -> Result<String, SmsError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let mut form: HashMap<&str, &str> = HashMap::new();
        form.insert("To", phone_number);
        form.insert("From", &self.from_number);
        form.insert("Body", message);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|err| SmsError(format!("request to Twilio failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError(format!("Twilio returned {status}: {body}")));
        }
        let message = response
            .json::<TwilioMessageResponse>()
            .await
            .map_err(|err| SmsError(format!("failed to parse Twilio response: {err}")))?;
        Ok(message.sid)
    }
}

/// Development sender used when no Twilio credentials are configured: the
/// code only shows up in the server log.
pub(crate) struct ConsoleSmsSender;

#[async_trait]
impl SmsSender for ConsoleSmsSender {
    async fn send(&self, phone_number: &str, message: &str) -> Result<String, SmsError> {
        tracing::info!("SMS to {phone_number}: {message}");
        Ok("console".to_string())
    }
}

#[derive(Clone)]
pub(crate) struct PhoneVerifierService {
    store: Arc<dyn VerificationStore>,
    sms: Arc<dyn SmsSender>,
}

impl PhoneVerifierService {
    pub(crate) fn new(store: Arc<dyn VerificationStore>, sms: Arc<dyn SmsSender>) -> Self {
        Self { store, sms }
    }

    fn cache_key(user_id: i64, phone_number: &str) -> String {
        format!("phone-verification:{user_id}:{phone_number}")
    }

    fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..6).map(|_| rng.gen_range(0..10).to_string()).collect()
    }

    /// Generates a fresh code, stores it under the `(user, phone)` key for
    /// ten minutes, and texts it out. Re-requesting overwrites the
    /// previous code.
    #[instrument(skip(self))]
    pub(crate) async fn send_code(
        &self,
        user_id: i64,
        phone_number: &str,
    ) -> Result<(), VerifierError> {
        let code = Self::generate_code();
        self.store
            .set(Self::cache_key(user_id, phone_number), code.clone(), CODE_TTL)
            .await;
        self.sms
            .send(
                phone_number,
                &format!("Quadmart: Your verification code is: {code}"),
            )
            .await?;
        Ok(())
    }

    /// Redeems a code. A hit deletes the entry so a code verifies at most
    /// once; a miss (wrong, expired, or never sent) is indistinguishable
    /// to the caller.
    #[instrument(skip(self, code))]
    pub(crate) async fn verify_code(
        &self,
        user_id: i64,
        phone_number: &str,
        code: &str,
    ) -> Result<(), VerifierError> {
        let key = Self::cache_key(user_id, phone_number);
        let stored = self.store.get(&key).await.ok_or(VerifierError::CodeMismatch)?;
        if stored != code {
            return Err(VerifierError::CodeMismatch);
        }
        self.store.delete(&key).await;
        Ok(())
    }
}

/// Normalizes a phone number to E.164-ish form: strips separators, keeps
/// a leading `+`. Returns `None` when what remains is not a plausible
/// number.
pub(crate) fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let digits: String = rest
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-' | '.'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(7..=15).contains(&digits.len()) {
        return None;
    }
    Some(format!("{plus}{digits}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSender {
        messages: std::sync::Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SmsSender for RecordingSender {
        async fn send(&self, phone_number: &str, message: &str) -> Result<String, SmsError> {
            self.messages
                .lock()
                .unwrap()
                .push((phone_number.to_string(), message.to_string()));
            Ok("SM123".to_string())
        }
    }

    struct FailingSender;

    #[async_trait]
    impl SmsSender for FailingSender {
        async fn send(&self, _: &str, _: &str) -> Result<String, SmsError> {
            Err(SmsError("provider down".to_string()))
        }
    }

    fn service_with(sender: Arc<dyn SmsSender>) -> (PhoneVerifierService, Arc<InMemoryVerificationStore>) {
        let store = Arc::new(InMemoryVerificationStore::default());
        (PhoneVerifierService::new(store.clone(), sender), store)
    }

    #[tokio::test]
    async fn code_round_trips() {
        let sender = Arc::new(RecordingSender {
            messages: Default::default(),
        });
        let (service, store) = service_with(sender.clone());
        service.send_code(7, "+12025550100").await.unwrap();

        let messages = sender.messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "+12025550100");
        let code = messages[0]
            .1
            .rsplit(' ')
            .next()
            .unwrap()
            .to_string();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        service.verify_code(7, "+12025550100", &code).await.unwrap();
        // redeemed codes are single-use
        assert!(store
            .get(&PhoneVerifierService::cache_key(7, "+12025550100"))
            .await
            .is_none());
        assert!(matches!(
            service.verify_code(7, "+12025550100", &code).await,
            Err(VerifierError::CodeMismatch)
        ));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_and_kept() {
        let sender = Arc::new(RecordingSender {
            messages: Default::default(),
        });
        let (service, store) = service_with(sender);
        service.send_code(7, "+12025550100").await.unwrap();
        assert!(matches!(
            service.verify_code(7, "+12025550100", "000000").await,
            Err(VerifierError::CodeMismatch)
        ));
        // a wrong guess does not consume the real code
        assert!(store
            .get(&PhoneVerifierService::cache_key(7, "+12025550100"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn expired_codes_never_verify() {
        let store = Arc::new(InMemoryVerificationStore::default());
        store
            .set("phone-verification:7:+12025550100".to_string(), "123456".to_string(), Duration::ZERO)
            .await;
        let service = PhoneVerifierService::new(store, Arc::new(FailingSender));
        assert!(matches!(
            service.verify_code(7, "+12025550100", "123456").await,
            Err(VerifierError::CodeMismatch)
        ));
    }

    #[tokio::test]
    async fn sms_failure_propagates() {
        let (service, _) = service_with(Arc::new(FailingSender));
        assert!(matches!(
            service.send_code(7, "+12025550100").await,
            Err(VerifierError::Sms(_))
        ));
    }

    #[test]
    fn phone_numbers_normalize() {
        assert_eq!(
            normalize_phone("+1 (202) 555 0100").as_deref(),
            Some("+12025550100")
        );
        assert_eq!(normalize_phone("215-555-0100").as_deref(), Some("2155550100"));
        assert_eq!(normalize_phone("not a phone"), None);
        assert_eq!(normalize_phone("+123"), None);
    }
}
