//! Bounded FIFO of pending HTTP requests.

use crate::network::application::http::Request;
use crate::network::error::Error;
use heapless::Deque;

/// Default number of requests that can wait at once.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// Strict FIFO of requests with a fixed capacity `Q`.
///
/// Submission past capacity fails with [`Error::QueueFull`]; existing entries are
/// never overwritten, merged or reordered.
///
/// # Examples
///
/// ```rust
/// use libat::modem::RequestQueue;
/// use libat::network::application::http::{Method, Request};
///
/// let mut queue: RequestQueue<2> = RequestQueue::new();
/// let request = Request::new("10.0.0.1", 80, Method::Get, "/").unwrap();
/// queue.submit(request.clone()).unwrap();
/// queue.submit(request.clone()).unwrap();
/// assert!(queue.submit(request).is_err());
/// ```
#[derive(Debug)]
pub struct RequestQueue<const Q: usize = DEFAULT_QUEUE_CAPACITY> {
    requests: Deque<Request, Q>,
}

impl<const Q: usize> Default for RequestQueue<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const Q: usize> RequestQueue<Q> {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            requests: Deque::new(),
        }
    }

    /// Appends a request at the back.
    pub fn submit(&mut self, request: Request) -> Result<(), Error> {
        self.requests.push_back(request).map_err(|_| Error::QueueFull)
    }

    /// The oldest request, which is the one served next.
    pub fn peek_front(&self) -> Option<&Request> {
        self.requests.front()
    }

    /// Removes and returns the oldest request.
    pub fn pop_front(&mut self) -> Option<Request> {
        self.requests.pop_front()
    }

    /// Number of waiting requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// `true` when the next submission would fail.
    pub fn is_full(&self) -> bool {
        self.requests.is_full()
    }

    /// Maximum number of waiting requests.
    pub const fn capacity(&self) -> usize {
        Q
    }

    /// Drops every waiting request.
    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Iterates from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Request> + '_ {
        self.requests.iter()
    }
}
