use crate::domain::model::{MessageResponse, ResetTicket};
use crate::domain::ports::{DeliveryAccountService, Notice, NotificationSink};
use crate::utils::error::Result;
use crate::utils::validation::{validate_email, validate_otp, validate_password, validate_required};
use std::sync::atomic::{AtomicBool, Ordering};

/// 請求進行中的旗標；guard 離開作用域時一定會清除，失敗時也一樣
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 外送人員的忘記密碼/重設密碼流程。
///
/// 表單驗證失敗時直接回傳錯誤（由呼叫端顯示在表單上），不會發出網路請求；
/// 服務錯誤則另外送出錯誤通知。
pub struct DeliveryRecovery<S: DeliveryAccountService, N: NotificationSink> {
    service: S,
    notifier: N,
    busy: AtomicBool,
}

impl<S: DeliveryAccountService, N: NotificationSink> DeliveryRecovery<S, N> {
    pub fn new(service: S, notifier: N) -> Self {
        Self {
            service,
            notifier,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub async fn request_reset(&self, email: &str) -> Result<ResetTicket> {
        validate_email(email)?;

        let _busy = BusyGuard::acquire(&self.busy);
        tracing::info!("🔑 Requesting password reset OTP");

        match self.service.forgot_password(email.trim()).await {
            Ok(ticket) => {
                self.notifier.notify(Notice::success(ticket.message.clone()));
                Ok(ticket)
            }
            Err(e) => {
                tracing::error!("🔑 Password reset request failed: {}", e);
                self.notifier.notify(Notice::error(e.user_friendly_message()));
                Err(e)
            }
        }
    }

    pub async fn reset_password(
        &self,
        token: &str,
        otp: &str,
        password: &str,
    ) -> Result<MessageResponse> {
        validate_required("token", token, "Reset link is invalid or missing")?;
        validate_otp(otp)?;
        validate_password(password)?;

        let _busy = BusyGuard::acquire(&self.busy);
        tracing::info!("🔑 Submitting password reset");

        match self.service.reset_password(token, otp.trim(), password).await {
            Ok(response) => {
                self.notifier.notify(Notice::success(response.message.clone()));
                Ok(response)
            }
            Err(e) => {
                tracing::error!("🔑 Password reset failed: {}", e);
                self.notifier.notify(Notice::error(e.user_friendly_message()));
                Err(e)
            }
        }
    }
}
