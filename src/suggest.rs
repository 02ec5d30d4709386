//! Suggestion intake for externally computed regions (pre-labeling).
//!
//! The editor hands out a [`SuggestionTicket`] per request. The external
//! service answers through a [`SuggestionSender`], which may live on any
//! thread; the editor drains the channel on its own thread and merges only
//! answers to tickets that are still pending.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::model::Geometry;

/// Identifies one suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionTicket(pub u64);

/// A region proposed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedRegion {
    /// Palette value; `None` stamps the active label
    #[serde(default)]
    pub label: Option<String>,
    pub geometry: Geometry,
}

/// The service's answer to one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub ticket: SuggestionTicket,
    pub regions: Vec<SuggestedRegion>,
}

/// Cloneable handle for delivering responses.
#[derive(Debug, Clone)]
pub struct SuggestionSender {
    tx: Sender<SuggestionResponse>,
}

impl SuggestionSender {
    /// Deliver a response. Returns false if the editor is gone.
    pub fn send(&self, response: SuggestionResponse) -> bool {
        let ticket = response.ticket;
        match self.tx.send(response) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("Suggestions: receiver dropped, response {:?} lost", ticket);
                false
            }
        }
    }
}

/// Pending tickets plus the receiving end of the channel.
#[derive(Debug)]
pub struct SuggestionQueue {
    tx: Sender<SuggestionResponse>,
    rx: Receiver<SuggestionResponse>,
    /// Ticket -> time of request
    pending: HashMap<SuggestionTicket, Instant>,
    next_ticket: u64,
    timeout: Duration,
}

impl SuggestionQueue {
    pub fn new(timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            pending: HashMap::new(),
            next_ticket: 1,
            timeout,
        }
    }

    /// Handle to give to the service.
    pub fn sender(&self) -> SuggestionSender {
        SuggestionSender {
            tx: self.tx.clone(),
        }
    }

    /// Register a new request.
    pub fn request(&mut self) -> SuggestionTicket {
        let ticket = SuggestionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, Instant::now());
        log::debug!("Suggestions: requested {:?}", ticket);
        ticket
    }

    pub fn is_pending(&self, ticket: SuggestionTicket) -> bool {
        self.pending.contains_key(&ticket)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stop waiting for a ticket; its response will be dropped.
    pub fn cancel(&mut self, ticket: SuggestionTicket) -> bool {
        let removed = self.pending.remove(&ticket).is_some();
        if removed {
            log::debug!("Suggestions: cancelled {:?}", ticket);
        }
        removed
    }

    /// Cancel every pending ticket. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        if count > 0 {
            log::debug!("Suggestions: cancelled {} pending tickets", count);
        }
        count
    }

    /// Take every response that arrived for a live ticket.
    ///
    /// Tickets older than the timeout are expired first; responses to
    /// expired, cancelled or unknown tickets are dropped. Each ticket is
    /// answered at most once.
    pub fn drain(&mut self) -> Vec<SuggestionResponse> {
        let timeout = self.timeout;
        self.pending.retain(|ticket, requested| {
            let alive = requested.elapsed() < timeout;
            if !alive {
                log::warn!("Suggestions: {:?} timed out after {:?}", ticket, timeout);
            }
            alive
        });

        let mut accepted = Vec::new();
        while let Ok(response) = self.rx.try_recv() {
            if self.pending.remove(&response.ticket).is_some() {
                log::debug!(
                    "Suggestions: {:?} answered with {} regions",
                    response.ticket,
                    response.regions.len()
                );
                accepted.push(response);
            } else {
                log::debug!(
                    "Suggestions: dropped response for stale {:?}",
                    response.ticket
                );
            }
        }
        accepted
    }
}
