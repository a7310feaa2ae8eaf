// ── HTTP-backed collaborators ──
//
// Implements the engine's collaborator traits on top of keysync-api.
// Message texts are composed here; the engine only decides when to send.

use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::SecretString;
use tracing::{debug, warn};

use keysync_api::booking::models::{GuestMessage, ReservationQuery};
use keysync_api::lock::models::CodeForm;
use keysync_api::sms::SmsMessage;
use keysync_api::{BookingClient, LockClient, SmsClient, TlsMode, TransportConfig};

use crate::config::{ConnectionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    AccessCode, AccessoireId, Booking, CodeId, CodeSpec, LockId, StayTimes,
};
use crate::source::{BookingPage, BookingSource, LockSource, Notifier, SmsAction};

// ── Transport ───────────────────────────────────────────────────────

fn transport(conn: &ConnectionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &conn.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: conn.timeout,
    }
}

/// The three remote collaborators, built from one connection config.
pub struct RemoteServices {
    pub bookings: RemoteBookings,
    pub locks: RemoteLocks,
    pub notifier: RemoteNotifier,
}

impl RemoteServices {
    pub fn build(conn: &ConnectionConfig, times: StayTimes) -> Result<Self, CoreError> {
        let transport = transport(conn);
        let booking_client = Arc::new(BookingClient::new(
            conn.booking_url.clone(),
            &conn.booking_api_key,
            &transport,
        )?);
        let lock_client = LockClient::new(conn.lock_url.clone(), &transport)?;
        let sms = match &conn.sms {
            Some(settings) => Some(SmsTarget {
                client: SmsClient::new(settings.url.clone(), settings.token.clone(), &transport)?,
                sender: settings.sender.clone(),
                recipients: settings.recipients.clone(),
            }),
            None => None,
        };

        Ok(Self {
            bookings: RemoteBookings {
                client: Arc::clone(&booking_client),
            },
            locks: RemoteLocks {
                client: lock_client,
                username: conn.lock_username.clone(),
                password: conn.lock_password.clone(),
            },
            notifier: RemoteNotifier {
                bookings: booking_client,
                sms,
                times,
            },
        })
    }
}

// ── Bookings ────────────────────────────────────────────────────────

pub struct RemoteBookings {
    client: Arc<BookingClient>,
}

impl BookingSource for RemoteBookings {
    async fn bookings_page(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> Result<BookingPage, CoreError> {
        let query = ReservationQuery {
            arrival_from: from,
            arrival_to: to,
            page,
            page_size,
        };
        let page = self.client.list_reservations(&query).await?;
        Ok(BookingPage {
            total_items: page.total_items,
            bookings: page.bookings.into_iter().map(Booking::from).collect(),
        })
    }
}

// ── Locks ───────────────────────────────────────────────────────────

pub struct RemoteLocks {
    client: LockClient,
    username: String,
    password: SecretString,
}

impl LockSource for RemoteLocks {
    async fn login(&self) -> Result<(), CoreError> {
        self.client.login(&self.username, &self.password).await?;
        Ok(())
    }

    async fn list_codes(&self, lock: LockId) -> Result<Vec<AccessCode>, CoreError> {
        let codes = self.client.list_codes(lock.get()).await?;
        debug!(lock = %lock, count = codes.len(), "listed codes");
        Ok(codes
            .into_iter()
            .map(|c| AccessCode::from_remote(lock, c))
            .collect())
    }

    async fn create_code(
        &self,
        lock: LockId,
        accessoire: &AccessoireId,
        spec: &CodeSpec,
    ) -> Result<AccessCode, CoreError> {
        let created = self
            .client
            .create_code(lock.get(), accessoire.as_str(), &CodeForm::from(spec))
            .await?;
        let mut code = spec.clone().into_code(CodeId::new(created.id), lock);
        if let Some(pin) = created.code.filter(|p| !p.is_empty()) {
            code.pin = Some(pin);
        }
        Ok(code)
    }

    async fn update_code(&self, code: CodeId, spec: &CodeSpec) -> Result<(), CoreError> {
        self.client
            .update_code(code.get(), &CodeForm::from(spec))
            .await?;
        Ok(())
    }

    async fn delete_code(&self, code: CodeId) -> Result<(), CoreError> {
        self.client.delete_code(code.get()).await?;
        Ok(())
    }
}

// ── Notifications ───────────────────────────────────────────────────

struct SmsTarget {
    client: SmsClient,
    sender: String,
    recipients: Vec<String>,
}

pub struct RemoteNotifier {
    bookings: Arc<BookingClient>,
    sms: Option<SmsTarget>,
    times: StayTimes,
}

fn format_day(day: Option<NaiveDate>) -> String {
    day.map_or_else(|| "?".into(), |d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn guest_message(
    booking: &Booking,
    full_pin: &str,
    apartment_name: &str,
    times: StayTimes,
) -> GuestMessage {
    let body = format!(
        "Hello {guest},\n\n\
         your door code for {apartment} is {full_pin}.\n\
         It works from {arrival} {check_in} until {departure} {check_out}.\n\n\
         Enjoy your stay!",
        guest = booking.guest_name,
        apartment = apartment_name,
        arrival = format_day(booking.arrival),
        departure = format_day(booking.departure),
        check_in = times.check_in.format("%H:%M"),
        check_out = times.check_out.format("%H:%M"),
    );
    GuestMessage {
        subject: format!("Your door code for {apartment_name}"),
        message_body: body,
    }
}

pub(crate) fn sms_text(
    booking: &Booking,
    full_pin: &str,
    apartment_name: &str,
    action: SmsAction,
) -> String {
    format!(
        "{action} booking #{id}\n{guest}\n{apartment_name}\n\
         {arrival} - {departure}\nPIN {full_pin}",
        id = booking.id,
        guest = booking.guest_name,
        arrival = format_day(booking.arrival),
        departure = format_day(booking.departure),
    )
}

impl Notifier for RemoteNotifier {
    async fn send_to_guest(&self, booking: &Booking, full_pin: &str, apartment_name: &str) -> bool {
        let message = guest_message(booking, full_pin, apartment_name, self.times);
        match self
            .bookings
            .send_message_to_guest(booking.id.as_str(), &message)
            .await
        {
            Ok(()) => {
                debug!(booking = %booking.id, "guest message sent");
                true
            }
            Err(e) => {
                warn!(booking = %booking.id, "guest message failed: {e}");
                false
            }
        }
    }

    async fn send_sms(
        &self,
        booking: &Booking,
        full_pin: &str,
        apartment_name: &str,
        action: SmsAction,
    ) -> bool {
        let Some(target) = &self.sms else {
            return true;
        };
        let text = sms_text(booking, full_pin, apartment_name, action);
        let mut all_sent = true;
        for to in &target.recipients {
            let message = SmsMessage {
                to,
                text: &text,
                sender: &target.sender,
            };
            if let Err(e) = target.client.send(&message).await {
                warn!(booking = %booking.id, to = %to, "SMS failed: {e}");
                all_sent = false;
            }
        }
        all_sent
    }
}
