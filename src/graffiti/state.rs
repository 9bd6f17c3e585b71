#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Encoding,
    AwaitingCredential,
    Uploading,
}

impl SubmissionPhase {
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

pub fn can_transition(from: SubmissionPhase, to: SubmissionPhase) -> bool {
    matches!(
        (from, to),
        (SubmissionPhase::Idle, SubmissionPhase::Encoding)
            | (SubmissionPhase::Encoding, SubmissionPhase::AwaitingCredential)
            | (SubmissionPhase::AwaitingCredential, SubmissionPhase::Uploading)
            | (SubmissionPhase::Encoding, SubmissionPhase::Idle)
            | (SubmissionPhase::AwaitingCredential, SubmissionPhase::Idle)
            | (SubmissionPhase::Uploading, SubmissionPhase::Idle)
    ) || from == to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_in_order() {
        use SubmissionPhase::*;
        assert!(can_transition(Idle, Encoding));
        assert!(can_transition(Encoding, AwaitingCredential));
        assert!(can_transition(AwaitingCredential, Uploading));
        assert!(can_transition(Uploading, Idle));
        assert!(!can_transition(Idle, Uploading));
        assert!(!can_transition(Uploading, Encoding));
        assert!(!can_transition(Idle, AwaitingCredential));
    }

    #[test]
    fn every_phase_can_abort_to_idle() {
        use SubmissionPhase::*;
        for phase in [Encoding, AwaitingCredential, Uploading] {
            assert!(phase.is_busy());
            assert!(can_transition(phase, Idle));
        }
        assert!(!Idle.is_busy());
    }
}
