use std::collections::HashSet;

use crate::{protocol::types::Sequence24, transport::Transmit};

use super::Session;

impl Session {
    /// Drop retained frame sets the peer has acknowledged.
    pub fn on_ack(&mut self, sequences: &[Sequence24]) {
        if sequences.is_empty() {
            return;
        }
        let before = self.sent_frames.len();
        for seq in sequences {
            self.sent_frames.remove(seq);
        }
        let frames = &self.sent_frames;
        self.sent_order.retain(|seq| frames.contains_key(seq));
        tracing::trace!(
            peer = %self.address,
            released = before - self.sent_frames.len(),
            "ack processed"
        );
    }

    /// Resend every retained frame set named by a nack, byte for byte.
    ///
    /// Each frame set goes out at most once per nack, however often it is
    /// named. Numbers that were acked, evicted or never reliable are
    /// skipped. Returns how many frame sets were resent.
    pub fn on_nack<T>(&mut self, sequences: &[Sequence24], out: &mut T) -> usize
    where
        T: Transmit + ?Sized,
    {
        let mut seen = HashSet::with_capacity(sequences.len().min(self.sent_frames.len()));
        let mut resent = 0;
        for seq in sequences {
            if !seen.insert(*seq) {
                continue;
            }
            let Some(datagram) = self.sent_frames.get(seq) else {
                tracing::trace!(peer = %self.address, seq = %seq, "nack for unretained frame set");
                continue;
            };
            match out.send_datagram(datagram, self.address) {
                Ok(()) => resent += 1,
                Err(e) => {
                    tracing::debug!(peer = %self.address, seq = %seq, error = %e, "resend failed")
                }
            }
        }
        if resent > 0 {
            tracing::debug!(peer = %self.address, resent, "nack resend");
        }
        resent
    }
}
