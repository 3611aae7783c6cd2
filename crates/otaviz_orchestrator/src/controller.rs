//! Phase controller
//!
//! Owns the whole scene: actor store, camera rig, animators, particles,
//! and the phase state machine. External triggers (user actions, backend
//! notifications) request phase changes; `tick` advances everything in a
//! fixed order so a frame is always internally consistent:
//!
//! 1. phase resolution (timed completions and auto-advance)
//! 2. camera
//! 3. actors
//! 4. particles
//!
//! All progress derives from the monotonic clock handed to `tick`; a
//! stalled or backwards clock degrades to a zero-length frame.

use crate::animators::{
    ledger, retrieval, FinalDecryptionAnimator, FinalEvent, HashMergeAnimator,
    KeyExchangeAnimator, LedgerAnimator, RetrievalAnimator,
};
use crate::choreographer::{CameraChoreographer, CameraEvent, RETURN_DWELL};
use crate::hooks::{CompletionHooks, FiredLatches, HookEvent};
use crate::phase::Phase;
use crate::triggers::{FileInfo, VerificationStage};
use otaviz_core::{clamp01, Color, Vec3};
use otaviz_scene::{
    ActorStore, CameraPose, CameraRig, Frame, OverlayLabel, ParticleBatch, SceneComposer,
};
use tracing::{debug, info};

/// Camera home pose
const HOME_POSITION: Vec3 = Vec3::new(0.0, 10.0, 55.0);

/// Seconds for the block-to-vehicle transfer
const TRANSFER_DURATION: f32 = 1.5;

/// Particles in the detonation burst
const BURST_COUNT: usize = 120;
const BURST_COLOR: u32 = 0xFCD34D;

/// Sub-stage tag carried by a ledger-info notification that includes a
/// block transfer replay
pub const SUB_STAGE_TRANSFER: &str = "transfer";

/// Small deterministic generator for burst velocities
struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    fn next_f32(&mut self) -> f32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        (self.0 >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// The orchestration engine
pub struct PhaseController {
    store: ActorStore,
    camera: CameraRig,
    choreographer: CameraChoreographer,
    ledger: LedgerAnimator,
    retrieval: RetrievalAnimator,
    hash_merge: HashMergeAnimator,
    key_exchange: KeyExchangeAnimator,
    final_decryption: FinalDecryptionAnimator,
    particles: Option<ParticleBatch>,
    pub hooks: CompletionHooks,
    latches: FiredLatches,
    phase: Phase,
    sub_stage: Option<String>,
    stage: VerificationStage,
    file_info: Option<FileInfo>,
    downloading: bool,
    camera_return_scheduled: bool,
    entered_at: f64,
    last_now: f64,
    started: bool,
    rng: XorShift32,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseController {
    pub fn new() -> Self {
        Self::with_seed(0x9E37_79B9)
    }

    /// Build the scene with a fixed burst seed (tests pin this)
    pub fn with_seed(seed: u32) -> Self {
        let mut store = ActorStore::new();
        let ledger = LedgerAnimator::default();
        let retrieval = RetrievalAnimator::default();
        let key_exchange = KeyExchangeAnimator::default();
        let final_decryption = FinalDecryptionAnimator::default();
        ledger.mount(&mut store);
        retrieval.mount(&mut store);
        key_exchange.mount(&mut store);
        final_decryption.mount(&mut store);
        info!(actors = store.len(), "scene mounted");

        Self {
            store,
            camera: CameraRig::new(HOME_POSITION, Vec3::ZERO),
            choreographer: CameraChoreographer::new(),
            ledger,
            retrieval,
            hash_merge: HashMergeAnimator::default(),
            key_exchange,
            final_decryption,
            particles: None,
            hooks: CompletionHooks::default(),
            latches: FiredLatches::default(),
            phase: Phase::Idle,
            sub_stage: None,
            stage: VerificationStage::Idle,
            file_info: None,
            downloading: false,
            camera_return_scheduled: false,
            entered_at: 0.0,
            last_now: 0.0,
            started: false,
            rng: XorShift32::new(seed),
        }
    }

    // ---- external triggers -------------------------------------------------

    /// User confirmed the update: start the scripted approach
    pub fn confirm_update(&mut self) {
        if self.phase == Phase::Idle {
            self.advance_phase();
        }
    }

    /// User declined the update: back to the resting scene
    pub fn cancel_update(&mut self) {
        self.reset();
    }

    /// Request a specific phase with an optional sub-stage tag.
    /// Re-requesting the current phase and sub-stage is a no-op.
    pub fn enter_phase(&mut self, phase: Phase, sub_stage: Option<&str>) {
        self.transition(phase, sub_stage.map(str::to_string));
    }

    /// Step to the next phase in the scripted chain
    pub fn advance_phase(&mut self) {
        let next = match self.phase {
            Phase::Idle => Some(Phase::ApproachLedger),
            phase => phase.successor(),
        };
        if let Some(next) = next {
            self.transition(next, None);
        }
    }

    /// Everything back to rest
    pub fn reset(&mut self) {
        self.stage = VerificationStage::Idle;
        self.downloading = false;
        self.file_info = None;
        self.transition(Phase::Idle, None);
    }

    /// Close-up on the vehicle dashboard
    pub fn show_car_interior(&mut self) {
        self.transition(Phase::CarInterior, None);
    }

    /// Transaction details arrived; optionally replay the block transfer
    pub fn ledger_info_received(&mut self, with_transfer: bool) {
        let sub = with_transfer.then(|| SUB_STAGE_TRANSFER.to_string());
        self.transition(Phase::LedgerInfoReceived, sub);
    }

    /// Download started/stopped. Repeats of the same flag are ignored.
    pub fn set_downloading(&mut self, active: bool, info: Option<FileInfo>) {
        if let Some(info) = info {
            self.file_info = Some(info);
        }
        if active == self.downloading {
            return;
        }
        self.downloading = active;
        if active {
            self.transition(Phase::ContentDownload, None);
        }
    }

    /// Backend verification stage changed. Duplicate announcements of the
    /// current stage are ignored.
    pub fn set_verification_stage(&mut self, stage: VerificationStage) {
        if stage == self.stage {
            debug!(%stage, "duplicate stage, ignored");
            return;
        }
        self.stage = stage;
        match stage {
            VerificationStage::HashVerification => {
                self.transition(Phase::HashVerification, None);
            }
            VerificationStage::CpabeDecryption => {
                self.transition(Phase::KeyExchangeDecryption, None);
            }
            VerificationStage::FinalDecryption => {
                self.transition(Phase::FinalDecryption, None);
            }
            VerificationStage::Idle => {
                if self.phase.in_verification_flow()
                    && self.latches.arm(HookEvent::VerificationComplete)
                {
                    self.hooks.fire(HookEvent::VerificationComplete);
                }
                self.transition(Phase::Idle, None);
            }
        }
    }

    /// Fly the camera back to home, reporting on arrival
    pub fn return_camera_home(&mut self) {
        self.choreographer.return_home(&self.camera, true);
    }

    // ---- tick --------------------------------------------------------------

    /// Advance the whole scene to `now` (monotonic seconds)
    pub fn tick(&mut self, now: f64) {
        let dt = if self.started {
            (now - self.last_now).max(0.0) as f32
        } else {
            0.0
        };
        self.started = true;
        self.last_now = now;
        self.camera.capture_home();

        // 1. phase resolution
        let elapsed = (now - self.entered_at).max(0.0) as f32;
        if let Some(duration) = self.phase.fixed_duration() {
            if elapsed >= duration {
                self.complete_timed_phase();
            }
        }

        // 2. camera
        match self.choreographer.tick(&mut self.camera, now, dt) {
            Some(CameraEvent::Arrived {
                phase: Phase::ApproachLedger,
            }) => {
                if self.latches.arm(HookEvent::CameraAtLedger) {
                    self.hooks.fire(HookEvent::CameraAtLedger);
                }
            }
            Some(CameraEvent::ReturnedHome { notify: true }) => {
                self.hooks.fire(HookEvent::ReturnHomeComplete);
            }
            _ => {}
        }

        // 3. actors
        let t = now as f32;
        let elapsed = (now - self.entered_at).max(0.0) as f32;
        self.ledger.idle(&mut self.store, t);
        self.retrieval.idle(&mut self.store, t);
        match self.phase {
            Phase::BlockFormation => {
                let progress = clamp01(elapsed / Phase::BlockFormation.fixed_duration().unwrap_or(1.0));
                self.ledger.formation(&mut self.store, progress);
            }
            Phase::LightTraversal => {
                let progress = clamp01(elapsed / Phase::LightTraversal.fixed_duration().unwrap_or(1.0));
                self.ledger.traversal(&mut self.store, progress, t);
            }
            Phase::VehicleTransfer => {
                let progress = clamp01(elapsed / TRANSFER_DURATION);
                match self.ledger.transfer(&mut self.store, progress) {
                    Ok(true) if !self.camera_return_scheduled => {
                        self.camera_return_scheduled = true;
                        self.choreographer.schedule_return_home(now + RETURN_DWELL);
                    }
                    Ok(_) => {}
                    Err(err) => debug!(%err, "transfer skipped"),
                }
            }
            Phase::LedgerInfoReceived => {
                if self.sub_stage.as_deref() == Some(SUB_STAGE_TRANSFER) {
                    let progress = clamp01(elapsed / TRANSFER_DURATION);
                    if let Err(err) = self.ledger.transfer(&mut self.store, progress) {
                        debug!(%err, "transfer skipped");
                    }
                }
            }
            Phase::ContentDownload => {
                let progress = clamp01(elapsed / retrieval::DOWNLOAD_DURATION);
                if self.retrieval.download(&mut self.store, progress)
                    && self.latches.arm(HookEvent::DownloadComplete)
                {
                    self.hooks.fire(HookEvent::DownloadComplete);
                    // The shard lands inside the vehicle; drop it from the
                    // next composed frame.
                    self.store.remove_named("shard-transfer");
                }
            }
            Phase::HashVerification => {
                self.hash_merge.tick(&mut self.store, t, dt);
            }
            Phase::KeyExchangeDecryption => {
                if self.key_exchange.tick(&mut self.store, t, elapsed, dt)
                    && self.latches.arm(HookEvent::KeyExchangeComplete)
                {
                    self.hooks.fire(HookEvent::KeyExchangeComplete);
                }
            }
            Phase::FinalDecryption => {
                match self.final_decryption.tick(&mut self.store, t, dt) {
                    Some(FinalEvent::MergeReached) => {
                        self.choreographer.return_home(&self.camera, false);
                    }
                    Some(FinalEvent::Detonated { origin }) => {
                        let rng = &mut self.rng;
                        self.particles = Some(ParticleBatch::burst(
                            origin,
                            BURST_COUNT,
                            Color::from_hex(BURST_COLOR),
                            &mut || rng.next_f32(),
                        ));
                        info!(count = BURST_COUNT, "detonation burst");
                    }
                    None => {}
                }
            }
            Phase::Idle | Phase::ApproachLedger | Phase::CarInterior | Phase::Complete => {}
        }

        // 4. particles
        if let Some(batch) = self.particles.as_mut() {
            batch.step(dt);
        }
    }

    /// Fire the completion for a timed phase and auto-advance.
    /// Camera-at-ledger is not fired here: that one belongs to the
    /// approach flight itself and fires on `CameraEvent::Arrived`.
    fn complete_timed_phase(&mut self) {
        if self.phase == Phase::BlockFormation {
            // Land the block at full scale before traversal starts.
            self.ledger.formation(&mut self.store, 1.0);
            if self.latches.arm(HookEvent::BlockFormed) {
                self.hooks.fire(HookEvent::BlockFormed);
            }
        }
        if let Some(next) = self.phase.successor() {
            self.transition(next, None);
        }
    }

    /// Switch phase: drop the old phase's scheduled return and transient
    /// clones, stamp the entry time, reset latches, start the new phase's
    /// camera flight. An in-progress flight keeps going until a new one
    /// replaces it, so a flight whose clock matches the phase clock still
    /// lands on its target. Re-entering the current phase with the same
    /// sub-stage is a no-op.
    fn transition(&mut self, phase: Phase, sub_stage: Option<String>) {
        if phase == self.phase && sub_stage == self.sub_stage {
            debug!(?phase, "already there, ignored");
            return;
        }
        info!(from = ?self.phase, to = ?phase, "phase transition");

        // Leave the current phase.
        self.choreographer.cancel_scheduled_return();
        self.store.discard_transient();
        self.ledger.end_transfer();
        self.retrieval.end_download();
        match self.phase {
            Phase::LightTraversal => self.ledger.end_traversal(&mut self.store),
            Phase::HashVerification => self.hash_merge.exit(&mut self.store),
            Phase::KeyExchangeDecryption => self.key_exchange.exit(&mut self.store),
            // The burst outlives the jump into Complete but nothing else.
            Phase::FinalDecryption if phase != Phase::Complete => {
                self.final_decryption.exit(&mut self.store);
                self.particles = None;
            }
            Phase::Complete => {
                self.final_decryption.exit(&mut self.store);
                self.particles = None;
            }
            _ => {}
        }

        // Enter the new one.
        self.phase = phase;
        self.sub_stage = sub_stage;
        self.entered_at = self.last_now;
        self.latches.reset();
        self.camera_return_scheduled = false;
        match phase {
            Phase::Idle => {
                self.ledger.reset(&mut self.store);
                self.key_exchange.exit(&mut self.store);
                self.final_decryption.exit(&mut self.store);
                self.particles = None;
                self.choreographer.return_home(&self.camera, false);
            }
            Phase::HashVerification => self.hash_merge.enter(&mut self.store),
            Phase::KeyExchangeDecryption => self.key_exchange.enter(&mut self.store),
            Phase::FinalDecryption => self.final_decryption.enter(&mut self.store),
            _ => {}
        }
        if let Some((pose, duration)) = CameraChoreographer::pose_for(phase) {
            self.choreographer.fly_to(&self.camera, phase, pose, duration);
        }
    }

    // ---- composition -------------------------------------------------------

    /// Overlay labels active for the current phase
    fn active_labels(&self) -> Vec<OverlayLabel> {
        let mut labels = Vec::new();
        for i in ledger::HIGHLIGHTED {
            if let Some(block) = self.store.by_name(&format!("block-{i}")) {
                labels.push(OverlayLabel::new(
                    format!("Block #{}", i + 1),
                    block.position.add(Vec3::new(0.0, 1.6, 0.0)),
                    0x3B82F6,
                ));
            }
        }
        match self.phase {
            Phase::BlockFormation | Phase::LightTraversal | Phase::VehicleTransfer => {
                if let Some(block) = self.store.by_name("block-12") {
                    labels.push(OverlayLabel::new(
                        "Block #13",
                        block.position.add(Vec3::new(0.0, 1.6, 0.0)),
                        0xFEF08A,
                    ));
                }
            }
            Phase::LedgerInfoReceived => {
                let cid = self
                    .file_info
                    .as_ref()
                    .map(|info| info.cid.as_str())
                    .unwrap_or("pending");
                labels.push(OverlayLabel::new(
                    "Update registered on ledger",
                    Vec3::new(0.0, 3.0, 0.0),
                    0x3B82F6,
                ));
                labels.push(OverlayLabel::new(
                    format!("CID {cid}"),
                    Vec3::new(0.0, 2.2, 0.0),
                    0x60A5FA,
                ));
            }
            Phase::ContentDownload => {
                if let Some(info) = &self.file_info {
                    labels.push(OverlayLabel::new(
                        format!("{} ({})", info.name, info.size_display()),
                        retrieval::GROUP_ORIGIN.add(Vec3::new(0.0, 6.0, 0.0)),
                        0x10B981,
                    ));
                }
            }
            Phase::HashVerification => {
                if self.hash_merge.is_merged() {
                    labels.push(OverlayLabel::new(
                        "Hashes match",
                        Vec3::new(0.0, 3.2, 0.0),
                        0x22C55E,
                    ));
                } else {
                    let (left, right) = self.hash_merge.cube_positions();
                    labels.push(OverlayLabel::new(
                        "Ledger hash",
                        left.add(Vec3::new(0.0, 1.2, 0.0)),
                        0x60A5FA,
                    ));
                    labels.push(OverlayLabel::new(
                        "Content hash",
                        right.add(Vec3::new(0.0, 1.2, 0.0)),
                        0x60A5FA,
                    ));
                }
            }
            Phase::KeyExchangeDecryption => {
                if let Some(key) = self.store.by_name("attr-key") {
                    if key.visible {
                        labels.push(OverlayLabel::new(
                            "Attribute key",
                            key.position.add(Vec3::new(0.0, 0.8, 0.0)),
                            0xFFD700,
                        ));
                    }
                }
                if let Some(sym) = self.store.by_name("sym-key") {
                    if sym.visible {
                        labels.push(OverlayLabel::new(
                            "Symmetric key",
                            sym.position.add(Vec3::new(0.0, 0.8, 0.0)),
                            0xFCD34D,
                        ));
                    }
                }
            }
            Phase::Complete => {
                labels.push(OverlayLabel::new(
                    "Update package decrypted",
                    Vec3::new(0.0, 4.0, 0.0),
                    0x22C55E,
                ));
            }
            _ => {}
        }
        labels
    }

    /// Gather the current state into one renderable frame
    pub fn compose_frame(&self) -> Frame {
        SceneComposer::compose(
            &self.store,
            &self.camera,
            self.particles.as_ref(),
            &self.active_labels(),
        )
    }

    // ---- accessors ---------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sub_stage(&self) -> Option<&str> {
        self.sub_stage.as_deref()
    }

    pub fn verification_stage(&self) -> VerificationStage {
        self.stage
    }

    pub fn file_info(&self) -> Option<&FileInfo> {
        self.file_info.as_ref()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn store(&self) -> &ActorStore {
        &self.store
    }

    pub fn particles(&self) -> Option<&ParticleBatch> {
        self.particles.as_ref()
    }

    pub fn is_camera_flying(&self) -> bool {
        self.choreographer.is_flying()
    }

    pub fn camera_flight_target(&self) -> Option<CameraPose> {
        self.choreographer.flight_target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_emits_unit_range() {
        let mut rng = XorShift32::new(42);
        for _ in 0..1000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_zero_seed_degrades_to_nonzero() {
        let mut rng = XorShift32::new(0);
        let a = rng.next_f32();
        let b = rng.next_f32();
        assert_ne!(a, b);
    }
}
