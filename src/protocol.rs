//! Wire records for the LED controller, and the decision of when to send one.

/// One outbound status record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub finger_count: u8,
    pub nod: bool,
}

impl OutboundMessage {
    /// The all-off record sent before the link closes.
    pub fn neutral() -> Self {
        Self {
            finger_count: 0,
            nod: false,
        }
    }

    /// `"<fingers>,<nod as 0|1>\n"` — the controller's line format.
    pub fn encode(&self) -> String {
        format!("{},{}\n", self.finger_count, u8::from(self.nod))
    }
}

/// Suppresses redundant sends: a record goes out only when the finger count
/// changed since the last emission, or a nod fired this frame.
#[derive(Debug, Default)]
pub struct EmissionGate {
    last_count: Option<u8>,
}

impl EmissionGate {
    pub fn new() -> Self {
        Self { last_count: None }
    }

    /// The remembered count advances on every emission, nod-triggered or not.
    pub fn decide(&mut self, finger_count: u8, nod: bool) -> Option<OutboundMessage> {
        if self.last_count == Some(finger_count) && !nod {
            return None;
        }
        self.last_count = Some(finger_count);
        Some(OutboundMessage { finger_count, nod })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_the_line_format() {
        let msg = OutboundMessage {
            finger_count: 3,
            nod: false,
        };
        assert_eq!(msg.encode(), "3,0\n");

        let msg = OutboundMessage {
            finger_count: 0,
            nod: true,
        };
        assert_eq!(msg.encode(), "0,1\n");

        assert_eq!(OutboundMessage::neutral().encode(), "0,0\n");
    }

    #[test]
    fn first_decision_always_emits() {
        let mut gate = EmissionGate::new();
        assert_eq!(
            gate.decide(0, false),
            Some(OutboundMessage {
                finger_count: 0,
                nod: false
            })
        );
        // An empty frame right after is quiet: still zero fingers, no nod.
        assert_eq!(gate.decide(0, false), None);
    }

    #[test]
    fn identical_state_is_suppressed() {
        let mut gate = EmissionGate::new();
        assert!(gate.decide(2, false).is_some());
        for _ in 0..5 {
            assert_eq!(gate.decide(2, false), None);
        }
    }

    #[test]
    fn count_change_or_nod_emits() {
        let mut gate = EmissionGate::new();
        assert!(gate.decide(0, false).is_some());

        // Count changed.
        assert!(gate.decide(3, false).is_some());
        assert!(gate.decide(3, false).is_none());

        // Nod with an unchanged count still goes out, every time it holds.
        assert!(gate.decide(3, true).is_some());
        assert!(gate.decide(3, true).is_some());
        assert!(gate.decide(3, false).is_none());
    }

    #[test]
    fn nod_triggered_emission_still_advances_the_count() {
        let mut gate = EmissionGate::new();
        assert!(gate.decide(0, false).is_some());

        let msg = gate.decide(4, true).expect("nod emission");
        assert_eq!(msg.finger_count, 4);
        assert!(msg.nod);

        // The count was remembered, so the same count without a nod is quiet.
        assert_eq!(gate.decide(4, false), None);
    }

    #[test]
    fn two_fingers_from_rest_emits_two_zero() {
        let mut gate = EmissionGate::new();
        assert!(gate.decide(0, false).is_some());

        let msg = gate.decide(2, false).expect("count change");
        assert_eq!(msg.encode(), "2,0\n");
    }

    #[test]
    fn classify_then_encode_end_to_end() {
        use crate::fingers;
        use crate::types::{FINGER_JOINTS, HandSample, MIDDLE_MCP, WRIST};

        // Index and middle extended, everything else folded flat.
        let mut hand = HandSample {
            points: [(0.5, 0.5); 21],
        };
        hand.points[WRIST] = (0.40, 0.80);
        hand.points[MIDDLE_MCP] = (0.55, 0.60);
        for slot in [0, 1] {
            let (tip, pip, mcp) = FINGER_JOINTS[slot];
            hand.points[mcp] = (0.5, 0.60);
            hand.points[pip] = (0.5, 0.50);
            hand.points[tip] = (0.5, 0.40);
        }

        let result = fingers::classify(&hand);
        assert_eq!(result.count, 2);
        assert_eq!(result.open, [false, true, true, false, false]);

        let mut gate = EmissionGate::new();
        assert!(gate.decide(0, false).is_some());
        let msg = gate.decide(result.count, false).expect("count change");
        assert_eq!(msg.encode(), "2,0\n");
    }
}
