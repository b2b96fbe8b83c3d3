use bytes::Bytes;

use crate::{
    RaknetError,
    protocol::{
        datagram::FrameSet,
        frame::{Frame, OrderingInfo},
        types::Sequence24,
    },
    transport::Transmit,
};

use super::Session;

impl Session {
    /// Wrap `frame` in a frame set under the next sequence number and send it.
    ///
    /// Reliable frames get the next reliable message index (and ordered
    /// frames an ordering index on channel 0) unless already set, and the
    /// encoded frame set is retained until acked or evicted. Transmission is
    /// best-effort: a socket error is logged and the frame set still counts
    /// as sent, so a nack can recover it.
    ///
    /// A body too long for the frame length field is refused with
    /// [`RaknetError::FrameTooLarge`] before any counter moves.
    pub fn send_frame<T>(&mut self, mut frame: Frame, out: &mut T) -> Result<Sequence24, RaknetError>
    where
        T: Transmit + ?Sized,
    {
        if !frame.fits_length_field() {
            return Err(RaknetError::FrameTooLarge(frame.body.len()));
        }

        let rel = frame.reliability;
        if rel.is_reliable() && frame.reliable_index.is_none() {
            frame.reliable_index = Some(self.next_reliable_index);
            self.next_reliable_index = self.next_reliable_index.next();
        }
        if rel.is_sequenced() && frame.sequence_index.is_none() {
            frame.sequence_index = Some(self.next_sequenced_index);
            self.next_sequenced_index = self.next_sequenced_index.next();
        }
        if (rel.is_ordered() || rel.is_sequenced()) && frame.ordering.is_none() {
            frame.ordering = Some(OrderingInfo {
                index: self.next_order_index,
                channel: 0,
            });
            // Sequenced frames ride on the current ordering index.
            if rel.is_ordered() {
                self.next_order_index = self.next_order_index.next();
            }
        }

        let sequence = self.next_sequence_number;
        let datagram = FrameSet { sequence, frame }.to_bytes();

        if let Err(e) = out.send_datagram(&datagram, self.address) {
            tracing::debug!(peer = %self.address, seq = %sequence, error = %e, "frame set send failed");
        } else {
            tracing::trace!(peer = %self.address, seq = %sequence, len = datagram.len(), "frame set sent");
        }

        if rel.is_reliable() {
            self.retain(sequence, datagram);
        }

        self.next_sequence_number = sequence.next();
        Ok(sequence)
    }

    fn retain(&mut self, sequence: Sequence24, datagram: Bytes) {
        if self.max_retained_frames == 0 {
            return;
        }
        while self.sent_order.len() >= self.max_retained_frames {
            let Some(evicted) = self.sent_order.pop_front() else {
                break;
            };
            self.sent_frames.remove(&evicted);
            tracing::trace!(peer = %self.address, seq = %evicted, "retention evicted");
        }
        self.sent_order.push_back(sequence);
        self.sent_frames.insert(sequence, datagram);
    }
}
