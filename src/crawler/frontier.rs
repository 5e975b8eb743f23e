//! Crawl frontier: pending URLs in discovery order plus the visited set.

use std::collections::{HashSet, VecDeque};

use url::Url;

/// Breadth-first crawl frontier
///
/// A URL enters the queue at most once. The visited set only grows, and
/// [`Frontier::pop`] stops handing out URLs once `max_pages` have been visited.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
    visited: Vec<Url>,
    visited_set: HashSet<String>,
    max_pages: usize,
}

impl Frontier {
    /// Create a frontier seeded with `seed`
    pub fn new(seed: Url, max_pages: usize) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            visited: Vec::new(),
            visited_set: HashSet::new(),
            max_pages,
        };
        frontier.push(seed);
        frontier
    }

    /// Enqueue a URL unless it was already queued or visited
    ///
    /// Returns `true` if the URL was added.
    pub fn push(&mut self, url: Url) -> bool {
        if self.visited_set.contains(url.as_str()) || !self.seen.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Pop the next unvisited URL and mark it visited
    ///
    /// Returns `None` when the queue is exhausted or the page ceiling is reached.
    pub fn pop(&mut self) -> Option<Url> {
        while self.visited.len() < self.max_pages {
            let url = self.queue.pop_front()?;
            if self.visited_set.insert(url.to_string()) {
                self.visited.push(url.clone());
                return Some(url);
            }
        }
        None
    }

    /// Number of URLs waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// URLs visited so far, in visit order
    pub fn visited(&self) -> &[Url] {
        &self.visited
    }

    /// Consume the frontier, returning the visited URLs in visit order
    pub fn into_visited(self) -> Vec<Url> {
        self.visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{}", path)).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(url("/"), 10);
        assert_eq!(frontier.pop(), Some(url("/")));

        frontier.push(url("/a"));
        frontier.push(url("/b"));
        frontier.push(url("/c"));

        assert_eq!(frontier.pop(), Some(url("/a")));
        assert_eq!(frontier.pop(), Some(url("/b")));
        assert_eq!(frontier.pop(), Some(url("/c")));
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_urls_enqueued_at_most_once() {
        let mut frontier = Frontier::new(url("/"), 10);
        assert!(!frontier.push(url("/")));

        assert!(frontier.push(url("/a")));
        assert!(!frontier.push(url("/a")));
        assert_eq!(frontier.pending(), 2);

        frontier.pop();
        frontier.pop();
        assert!(!frontier.push(url("/a")));
        assert_eq!(frontier.visited().len(), 2);
    }

    #[test]
    fn test_page_ceiling() {
        let mut frontier = Frontier::new(url("/"), 2);
        for i in 0..5 {
            frontier.push(url(&format!("/page/{}", i)));
        }

        assert!(frontier.pop().is_some());
        assert!(frontier.pop().is_some());
        assert_eq!(frontier.pop(), None);
        assert_eq!(frontier.pending(), 4);
        assert_eq!(frontier.into_visited().len(), 2);
    }

    #[test]
    fn test_zero_ceiling_visits_nothing() {
        let mut frontier = Frontier::new(url("/"), 0);
        assert_eq!(frontier.pop(), None);
        assert!(frontier.visited().is_empty());
    }
}
