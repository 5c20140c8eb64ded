//! Deduplicating board of incoming dispatch offers
//!
//! The dispatch channel replays offers: the same emergency can arrive both
//! in a batch and as a single push. The board keeps the first copy of each
//! offer, in arrival order, keyed by its booking or request id.

use crate::processing::message::{parse_dispatch_payload, DispatchOffer, MessageError};
use log::warn;
use std::collections::HashSet;

/// Active offers awaiting a driver decision
#[derive(Debug, Default)]
pub struct OfferBoard {
    offers: Vec<DispatchOffer>,
    seen: HashSet<String>,
}

impl OfferBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dispatch payload and add the offers not seen before.
    ///
    /// Offers carrying no id at all cannot be tracked and are dropped.
    /// Returns how many offers were added.
    pub fn ingest(&mut self, payload: &str) -> Result<usize, MessageError> {
        let offers = parse_dispatch_payload(payload)?;
        let mut added = 0;
        for offer in offers {
            match offer.offer_id() {
                Some(id) => {
                    if self.seen.insert(id.to_string()) {
                        self.offers.push(offer);
                        added += 1;
                    }
                }
                None => warn!("dropping dispatch offer without booking or request id"),
            }
        }
        Ok(added)
    }

    /// Offers in arrival order
    pub fn offers(&self) -> &[DispatchOffer] {
        &self.offers
    }

    /// Remove and return an offer once the driver has decided on it.
    ///
    /// The id stays on record, so a late replay of the same offer does not
    /// resurface it.
    pub fn take(&mut self, offer_id: &str) -> Option<DispatchOffer> {
        let index = self
            .offers
            .iter()
            .position(|offer| offer.offer_id() == Some(offer_id))?;
        Some(self.offers.remove(index))
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Drop all offers and forget which ids were seen
    pub fn clear(&mut self) {
        self.offers.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"{"bookingId":"bkg-1","pickupLat":18.9,"pickupLon":72.8}"#;

    #[test]
    fn test_ingest_deduplicates_by_id() {
        let mut board = OfferBoard::new();
        assert_eq!(board.ingest(SINGLE).unwrap(), 1);
        assert_eq!(board.ingest(SINGLE).unwrap(), 0);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_batch_and_push_forms_share_dedup() {
        let mut board = OfferBoard::new();
        let batch = r#"[
            "{\"bookingId\":\"bkg-1\",\"pickupLat\":18.9,\"pickupLon\":72.8}",
            "{\"requestId\":\"req-2\",\"pickupLat\":19.0,\"pickupLon\":72.9}"
        ]"#;
        assert_eq!(board.ingest(batch).unwrap(), 2);
        // The same booking pushed individually is already known
        assert_eq!(board.ingest(SINGLE).unwrap(), 0);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_offers_without_ids_are_dropped() {
        let mut board = OfferBoard::new();
        let added = board
            .ingest(r#"{"pickupLat":18.9,"pickupLon":72.8}"#)
            .unwrap();
        assert_eq!(added, 0);
        assert!(board.is_empty());
    }

    #[test]
    fn test_taken_offers_do_not_resurface() {
        let mut board = OfferBoard::new();
        board.ingest(SINGLE).unwrap();
        let offer = board.take("bkg-1").unwrap();
        assert_eq!(offer.offer_id(), Some("bkg-1"));
        assert!(board.is_empty());

        // Replay after the decision: still deduplicated
        assert_eq!(board.ingest(SINGLE).unwrap(), 0);
        assert!(board.take("bkg-1").is_none());
    }

    #[test]
    fn test_clear_forgets_history() {
        let mut board = OfferBoard::new();
        board.ingest(SINGLE).unwrap();
        board.clear();
        assert_eq!(board.ingest(SINGLE).unwrap(), 1);
    }
}
