//! Completion hooks
//!
//! The embedding dashboard registers callbacks for the moments it reports
//! upstream (acknowledgements over the realtime channel, UI state). Each
//! hook fires at most once per phase activation; the latches live in the
//! controller and reset on phase entry.

/// Boxed completion callback
pub type Hook = Box<dyn FnMut() + Send>;

/// Moments the controller reports to the embedder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookEvent {
    /// Camera flight to the ledger finished
    CameraAtLedger,
    /// The new block finished growing in
    BlockFormed,
    /// The storage shard reached the vehicle
    DownloadComplete,
    /// The symmetric key was recovered from the ciphertext
    KeyExchangeComplete,
    /// The whole verification flow wound down
    VerificationComplete,
    /// Camera returned to the home pose
    ReturnHomeComplete,
}

/// Registered callbacks, all optional
#[derive(Default)]
pub struct CompletionHooks {
    pub on_camera_at_ledger: Option<Hook>,
    pub on_block_formed: Option<Hook>,
    pub on_download_complete: Option<Hook>,
    pub on_key_exchange_complete: Option<Hook>,
    pub on_verification_complete: Option<Hook>,
    pub on_return_home_complete: Option<Hook>,
}

impl CompletionHooks {
    pub(crate) fn fire(&mut self, event: HookEvent) {
        let slot = match event {
            HookEvent::CameraAtLedger => &mut self.on_camera_at_ledger,
            HookEvent::BlockFormed => &mut self.on_block_formed,
            HookEvent::DownloadComplete => &mut self.on_download_complete,
            HookEvent::KeyExchangeComplete => &mut self.on_key_exchange_complete,
            HookEvent::VerificationComplete => &mut self.on_verification_complete,
            HookEvent::ReturnHomeComplete => &mut self.on_return_home_complete,
        };
        if let Some(hook) = slot.as_mut() {
            hook();
        }
    }
}

/// One latch per hook, reset on every phase entry
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FiredLatches {
    camera_at_ledger: bool,
    block_formed: bool,
    download_complete: bool,
    key_exchange_complete: bool,
    verification_complete: bool,
}

impl FiredLatches {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns true the first time `event` is seen since the last reset.
    /// The return-home hook is latched by the choreographer instead.
    pub(crate) fn arm(&mut self, event: HookEvent) -> bool {
        let slot = match event {
            HookEvent::CameraAtLedger => &mut self.camera_at_ledger,
            HookEvent::BlockFormed => &mut self.block_formed,
            HookEvent::DownloadComplete => &mut self.download_complete,
            HookEvent::KeyExchangeComplete => &mut self.key_exchange_complete,
            HookEvent::VerificationComplete => &mut self.verification_complete,
            HookEvent::ReturnHomeComplete => return true,
        };
        let first = !*slot;
        *slot = true;
        first
    }
}
