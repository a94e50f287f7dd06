//! Ed25519 keygen / sign / verify as a benchmark workload.
//!
//! Categories are message lengths. The message is a fixed pattern built
//! once at construction, so no phase pays for filling it. Every round
//! derives a fresh signing key from the round seed (SHA-256 of the seed
//! bytes), signs the first `len` message bytes and verifies the signature:
//!
//! | Phase  | Label | Output                  |
//! |--------|-------|-------------------------|
//! | keygen | kg    | 32-byte verifying key   |
//! | sign   | sg    | 64-byte signature       |
//! | verify | vf    | nothing, or `Rejected`  |
//!
//! The startup pass also times `hpk`: SHA-512 of the verifying key.
//!
//! Ed25519 signing is deterministic and never retries internally, so the
//! sign figures carry no restarts on hardware: `sg (...)` equals `sg` and
//! `rs=0`. That is the expected result for this workload, not a check of
//! the restart detector, which is covered by the `bench-common` tests.

use bench_common::{Fault, Phase, Workload};
use ed25519_dalek::{
    PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH,
    SIGNATURE_LENGTH,
    Signature,
    Signer,
    SigningKey,
    Verifier,
    VerifyingKey,
};
use sha2::{Digest, Sha256, Sha512};

/// Number of message lengths measured.
pub const CATEGORY_COUNT: usize = 3;
/// keygen, sign, verify.
pub const PHASE_COUNT: usize = 3;

/// Message length of each category, in bytes.
pub const MESSAGE_LENS: [u32; CATEGORY_COUNT] = [64, 256, 1024];

/// Longest message, sized for the largest category.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// Message bytes: low byte of `i` XOR (`0x5b` times its high byte). Every
/// category signs a prefix of the same pattern.
const fn message_pattern() -> [u8; MAX_MESSAGE_LEN] {
    let mut message = [0u8; MAX_MESSAGE_LEN];
    let mut i = 0;
    while i < MAX_MESSAGE_LEN {
        message[i] = (i as u8) ^ ((i >> 8) as u8).wrapping_mul(0x5b);
        i += 1;
    }
    message
}

const KEYGEN: usize = 0;
const SIGN: usize = 1;
const VERIFY: usize = 2;

/// Ed25519 over messages of 64, 256 and 1024 bytes.
pub struct Ed25519Workload {
    signing_key: Option<SigningKey>,
    verifying_key: Option<VerifyingKey>,
    message: [u8; MAX_MESSAGE_LEN],
    signature: Option<[u8; SIGNATURE_LENGTH]>,
}

impl Ed25519Workload {
    pub const fn new() -> Self {
        Self {
            signing_key: None,
            verifying_key: None,
            message: message_pattern(),
            signature: None,
        }
    }

    /// Verifying key produced by the last keygen.
    pub fn verifying_key(&self) -> Option<&VerifyingKey> { self.verifying_key.as_ref() }

    /// Signature produced by the last sign.
    pub fn signature(&self) -> Option<&[u8; SIGNATURE_LENGTH]> { self.signature.as_ref() }

    fn message_len(category: usize) -> usize { MESSAGE_LENS[category] as usize }

    fn keygen(
        &mut self,
        seed: &[u8],
    ) -> usize {
        let mut secret = [0u8; SECRET_KEY_LENGTH];
        secret.copy_from_slice(&Sha256::digest(seed));
        let signing_key = SigningKey::from_bytes(&secret);

        self.verifying_key = Some(signing_key.verifying_key());
        self.signing_key = Some(signing_key);
        self.signature = None;
        PUBLIC_KEY_LENGTH
    }

    fn sign(
        &mut self,
        category: usize,
    ) -> Result<usize, Fault> {
        let key = self.signing_key.as_ref().ok_or(Fault::MissingInput)?;
        let signature = key.sign(&self.message[..Self::message_len(category)]);
        self.signature = Some(signature.to_bytes());
        Ok(SIGNATURE_LENGTH)
    }

    fn verify(
        &self,
        category: usize,
    ) -> Result<usize, Fault> {
        let key = self.verifying_key.as_ref().ok_or(Fault::MissingInput)?;
        let bytes = self.signature.as_ref().ok_or(Fault::MissingInput)?;
        let signature = Signature::from_bytes(bytes);
        key.verify(&self.message[..Self::message_len(category)], &signature)
            .map_err(|_| Fault::Rejected)?;
        Ok(0)
    }
}

impl Default for Ed25519Workload {
    fn default() -> Self { Self::new() }
}

impl Workload<CATEGORY_COUNT, PHASE_COUNT> for Ed25519Workload {
    const NAME: &'static str = "Ed25519";
    const PARAM: &'static str = "len";
    const CATEGORIES: [u32; CATEGORY_COUNT] = MESSAGE_LENS;
    const PHASES: [Phase; PHASE_COUNT] = [
        Phase {
            name: "keygen",
            label: "kg",
            width: 9,
            detect_restarts: false,
        },
        Phase {
            name: "sign",
            label: "sg",
            width: 8,
            detect_restarts: true,
        },
        Phase {
            name: "verify",
            label: "vf",
            width: 8,
            detect_restarts: false,
        },
    ];

    const STARTUP_EXTRA: Option<Phase> = Some(Phase {
        name: "hpk",
        label: "hpk",
        width: 6,
        detect_restarts: false,
    });

    /// log2 of the message length (6, 8, 10).
    fn category_tag(
        &self,
        category: usize,
    ) -> u8 {
        MESSAGE_LENS[category].trailing_zeros() as u8
    }

    fn expected_len(
        &self,
        phase: usize,
        _category: usize,
    ) -> Option<usize> {
        match phase {
            KEYGEN => Some(PUBLIC_KEY_LENGTH),
            SIGN => Some(SIGNATURE_LENGTH),
            _ => None,
        }
    }

    /// SHA-512 of the verifying key from the last keygen.
    fn run_startup_extra(
        &mut self,
        _category: usize,
    ) -> Result<usize, Fault> {
        let key = self.verifying_key.as_ref().ok_or(Fault::MissingInput)?;
        Ok(Sha512::digest(key.as_bytes()).len())
    }

    fn run(
        &mut self,
        phase: usize,
        category: usize,
        seed: &[u8],
    ) -> Result<usize, Fault> {
        if category >= CATEGORY_COUNT {
            return Err(Fault::Internal);
        }
        match phase {
            KEYGEN => Ok(self.keygen(seed)),
            SIGN => self.sign(category),
            VERIFY => self.verify(category),
            _ => Err(Fault::Internal),
        }
    }
}

// =============================================================================
// Unit Tests (run on host with: cargo test --lib --target <host-triple>)
// =============================================================================

#[cfg(test)]
mod tests {
    use bench_common::{BufferChannel, CycleTimer, Driver, DriverConfig, HaltReason, Iteration};

    use super::*;

    /// Advances a fixed number of ticks per read.
    struct StepTimer {
        now: u32,
        step: u32,
    }

    impl CycleTimer for StepTimer {
        fn now(&mut self) -> u32 {
            let now = self.now;
            self.now = self.now.wrapping_add(self.step);
            now
        }
    }

    fn round(
        workload: &mut Ed25519Workload,
        category: usize,
        seed: &[u8],
    ) -> [Result<usize, Fault>; PHASE_COUNT] {
        core::array::from_fn(|p| workload.run(p, category, seed))
    }

    #[test]
    fn test_category_tags_are_log2_of_length() {
        let w = Ed25519Workload::new();
        assert_eq!(w.category_tag(0), 6);
        assert_eq!(w.category_tag(1), 8);
        assert_eq!(w.category_tag(2), 10);
        assert_eq!(w.reference_seed(2), [10, 0]);
    }

    #[test]
    fn test_keygen_is_deterministic() {
        let mut a = Ed25519Workload::new();
        let mut b = Ed25519Workload::new();
        assert_eq!(a.run(KEYGEN, 0, &[6, 1, 0, 0, 0]), Ok(PUBLIC_KEY_LENGTH));
        assert_eq!(b.run(KEYGEN, 0, &[6, 1, 0, 0, 0]), Ok(PUBLIC_KEY_LENGTH));
        assert_eq!(a.verifying_key(), b.verifying_key());

        b.run(KEYGEN, 0, &[6, 2, 0, 0, 0]).unwrap();
        assert_ne!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn test_keygen_leaves_message_untouched() {
        let mut w = Ed25519Workload::new();
        let before = w.message;
        w.run(KEYGEN, 0, &[6, 1, 0, 0, 0]).unwrap();
        assert_eq!(w.message, before);
        w.run(KEYGEN, 2, &[10, 1, 0, 0, 0]).unwrap();
        assert_eq!(w.message, before);
        assert_eq!(w.message, message_pattern());
        // Not all zero, and not a repeating 256-byte block
        assert_ne!(w.message[1], 0);
        assert_ne!(w.message[..256], w.message[256..512]);
    }

    #[test]
    fn test_startup_extra_hashes_verifying_key() {
        let mut w = Ed25519Workload::new();
        assert_eq!(w.run_startup_extra(0), Err(Fault::MissingInput));
        w.run(KEYGEN, 0, &[6, 0]).unwrap();
        assert_eq!(w.run_startup_extra(0), Ok(64));
    }

    #[test]
    fn test_full_round_every_category() {
        let mut w = Ed25519Workload::new();
        for c in 0..CATEGORY_COUNT {
            let seed = [w.category_tag(c), 3, 0, 0, 0];
            assert_eq!(round(&mut w, c, &seed), [Ok(PUBLIC_KEY_LENGTH), Ok(SIGNATURE_LENGTH), Ok(0)]);
        }
    }

    #[test]
    fn test_sign_is_deterministic() {
        let mut w = Ed25519Workload::new();
        round(&mut w, 1, &[8, 0]);
        let first = *w.signature().unwrap();
        round(&mut w, 1, &[8, 0]);
        assert_eq!(w.signature(), Some(&first));
    }

    #[test]
    fn test_corrupted_signature_rejected() {
        let mut w = Ed25519Workload::new();
        w.run(KEYGEN, 0, &[6, 0]).unwrap();
        w.run(SIGN, 0, &[6, 0]).unwrap();
        if let Some(sig) = w.signature.as_mut() {
            sig[0] ^= 0x01;
        }
        assert_eq!(w.run(VERIFY, 0, &[6, 0]), Err(Fault::Rejected));
    }

    #[test]
    fn test_phases_out_of_order() {
        let mut w = Ed25519Workload::new();
        assert_eq!(w.run(SIGN, 0, &[6, 0]), Err(Fault::MissingInput));
        assert_eq!(w.run(VERIFY, 0, &[6, 0]), Err(Fault::MissingInput));

        // A fresh keygen invalidates the previous signature
        round(&mut w, 0, &[6, 0]);
        w.run(KEYGEN, 0, &[6, 1]).unwrap();
        assert_eq!(w.run(VERIFY, 0, &[6, 1]), Err(Fault::MissingInput));
    }

    #[test]
    fn test_out_of_range_indices() {
        let mut w = Ed25519Workload::new();
        assert_eq!(w.run(KEYGEN, CATEGORY_COUNT, &[0]), Err(Fault::Internal));
        assert_eq!(w.run(PHASE_COUNT, 0, &[0]), Err(Fault::Internal));
    }

    #[test]
    fn test_driver_runs_ed25519() {
        let timer = StepTimer { now: 0, step: 100 };
        let out: BufferChannel<2048> = BufferChannel::new();
        let mut driver = Driver::new(out, timer, Ed25519Workload::new(), DriverConfig::new());

        let primed = driver.prime().unwrap();
        assert_eq!(primed, [[100; PHASE_COUNT]; CATEGORY_COUNT]);

        for n in 1..=2 {
            match driver.run_one_iteration() {
                Ok(Iteration::Report(report)) => assert_eq!(report.iteration, n),
                other => panic!("expected report, got {:?}", other),
            }
        }
        assert!(driver.halted().is_none());

        let text = driver.output().as_str().unwrap();
        assert!(text.contains("Ed25519(len =   64)  keygen:       100  sign:      100  verify:      100  hpk:    100\n"));
        assert!(text.contains("\nnum = 2\n"));
        assert!(text.contains("Ed25519(len = 1024)  kg:       100  sg:      100  (     100)  vf:      100  rs=0\n"));
    }

    /// Flips a signature bit between sign and verify.
    struct Tampered(Ed25519Workload);

    impl Workload<CATEGORY_COUNT, PHASE_COUNT> for Tampered {
        const NAME: &'static str = "Ed25519";
        const PARAM: &'static str = "len";
        const CATEGORIES: [u32; CATEGORY_COUNT] = MESSAGE_LENS;
        const PHASES: [Phase; PHASE_COUNT] = <Ed25519Workload as Workload<CATEGORY_COUNT, PHASE_COUNT>>::PHASES;

        fn run(
            &mut self,
            phase: usize,
            category: usize,
            seed: &[u8],
        ) -> Result<usize, Fault> {
            let result = self.0.run(phase, category, seed);
            if phase == SIGN && category == 1 {
                if let Some(sig) = self.0.signature.as_mut() {
                    sig[SIGNATURE_LENGTH - 1] ^= 0x80;
                }
            }
            result
        }
    }

    #[test]
    fn test_driver_halts_on_rejected_signature() {
        let timer = StepTimer { now: 0, step: 10 };
        let out: BufferChannel<512> = BufferChannel::new();
        let mut driver = Driver::new(out, timer, Tampered(Ed25519Workload::new()), DriverConfig::new());

        let halt = driver.prime().unwrap_err();
        assert_eq!(halt.phase, "verify");
        assert_eq!(halt.category, 1);
        assert_eq!(halt.reason, HaltReason::Fault(Fault::Rejected));
        assert!(driver.output().as_str().unwrap().ends_with("ERR verify\n"));

        // Terminal: no further rounds, no further output
        let len = driver.output().len();
        assert_eq!(driver.run_one_iteration(), Err(halt));
        assert_eq!(driver.output().len(), len);
        assert_eq!(driver.iteration(), 0);
    }
}
