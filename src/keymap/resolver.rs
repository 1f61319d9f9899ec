//! The resolution engine: turns a stream of typed keys into resolved keys
//!
//! Keys are appended to a pending queue and matched against the keymap of
//! the consumer's current mode. A prefix of a longer mapping waits for more
//! keys or the ambiguity timeout. A full match is replaced in the queue by
//! its rhs, which is either emitted as is (noremap) or matched again (remap).
//! Keys nothing applies to are emitted unchanged, one at a time.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::binding::KeyMapping;
use super::command::MapCommand;
use super::keymap::Keymap;
use super::keypress::keys_from_keystroke;
use super::notation::{decode_bytes, decode_for_display, encode};
use super::timer::AmbiguityTimer;
use super::types::{Key, Keystroke, Mode};
use crate::config::EngineConfig;

/// Outcome of feeding keys to the [`Mapper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Keys were resolved and handed to the consumer; the queue is empty
    Done,
    /// Pending keys are a prefix of a longer mapping; waiting for more input
    /// or the timeout
    Ambiguous,
    /// Nothing was handed to the consumer and the queue is empty
    NoMatch,
}

/// Reply of a mode's key handler for one resolved key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// The key finished a command
    Complete,
    /// The key is part of a multi-key command, await more
    AwaitMore,
    /// Await more, and the next key must not go through mappings
    /// (e.g. the register name after `"`)
    AwaitLiteral,
    /// The handler did not use the key; the host toolkit should get it
    Unhandled,
}

/// The active mode's key handler
pub trait KeyConsumer {
    /// Mode whose mappings apply to the next lookup
    fn mode(&self) -> Mode;

    /// Handle one resolved key
    fn handle_key(&mut self, key: Key) -> KeyResult;
}

/// A consumer that records every key it gets, in a fixed mode
#[derive(Debug, Clone, Default)]
pub struct KeyRecorder {
    pub mode: Mode,
    pub keys: Vec<Key>,
}

impl KeyRecorder {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            keys: Vec::new(),
        }
    }

    /// Recorded keys rendered as display text
    pub fn display(&self) -> String {
        decode_for_display(&self.keys)
    }

    /// Take the recorded keys, leaving the recorder empty
    pub fn take(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.keys)
    }
}

impl KeyConsumer for KeyRecorder {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn handle_key(&mut self, key: Key) -> KeyResult {
        self.keys.push(key);
        KeyResult::Complete
    }
}

/// Keys shown to the user while a command or mapping is incomplete
#[derive(Debug, Clone)]
struct ShowCmd {
    /// Keys of an unfinished consumer command
    committed: Vec<Key>,
    /// Keys waiting for an ambiguous mapping
    pending: Vec<Key>,
    width: usize,
}

impl ShowCmd {
    fn new(width: usize) -> Self {
        Self {
            committed: Vec::new(),
            pending: Vec::new(),
            width,
        }
    }

    fn clear(&mut self) {
        self.committed.clear();
        self.pending.clear();
    }

    /// Keep the last `width` characters, they are the most recent keys
    fn text(&self) -> String {
        let keys: Vec<Key> = self
            .committed
            .iter()
            .chain(self.pending.iter())
            .copied()
            .collect();
        let text = decode_for_display(&keys);
        let len = text.chars().count();
        if len <= self.width {
            text
        } else {
            text.chars().skip(len - self.width).collect()
        }
    }
}

struct Expansion {
    lhs_len: usize,
    rhs: Vec<Key>,
    remap: bool,
    self_prefixed: bool,
}

impl From<&KeyMapping> for Expansion {
    fn from(mapping: &KeyMapping) -> Self {
        Self {
            lhs_len: mapping.input.len(),
            rhs: mapping.replacement.clone(),
            remap: mapping.remap,
            self_prefixed: mapping.is_self_prefixed(),
        }
    }
}

/// Mapping engine for one input context (one per client window)
///
/// Owns the keymap, the pending key queue and the ambiguity timer.
#[derive(Debug, Clone)]
pub struct Mapper {
    keymap: Keymap,
    /// Typed keys not yet handed to the consumer
    queue: VecDeque<Key>,
    /// Number of leading queue keys that need no further mapping
    resolved: usize,
    /// Skip mapping lookups until the next key is handed out
    suppress_mapping: bool,
    timer: AmbiguityTimer,
    showcmd: ShowCmd,
    /// False if the consumer declined a key during the last call
    processed: bool,
    max_remap_depth: usize,
}

impl Mapper {
    /// Create a mapper with default settings
    pub fn new(keymap: Keymap) -> Self {
        Self::with_config(keymap, &EngineConfig::default())
    }

    pub fn with_config(keymap: Keymap, config: &EngineConfig) -> Self {
        Self {
            keymap,
            queue: VecDeque::new(),
            resolved: 0,
            suppress_mapping: false,
            timer: AmbiguityTimer::new(config.timeout()),
            showcmd: ShowCmd::new(config.showcmd_width),
            processed: true,
            max_remap_depth: config.max_remap_depth,
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn insert(&mut self, mode: Mode, lhs: &str, rhs: &str, remap: bool) {
        self.keymap.insert(mode, lhs, rhs, remap);
    }

    pub fn delete(&mut self, mode: Mode, lhs: &str) -> bool {
        self.keymap.delete(mode, lhs)
    }

    /// Apply a parsed `:map`-family command
    ///
    /// Returns false only for an unmap of a missing mapping.
    pub fn execute(&mut self, command: &MapCommand) -> bool {
        match command {
            MapCommand::Map {
                mode,
                lhs,
                rhs,
                remap,
            } => {
                self.keymap.insert(*mode, lhs, rhs, *remap);
                true
            }
            MapCommand::Unmap { mode, lhs } => self.keymap.delete(*mode, lhs),
        }
    }

    /// Feed typed keys, restarting the ambiguity timer at `now`
    pub fn handle_keys_at<C>(&mut self, keys: &[Key], now: Instant, consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.feed(keys, now, true, consumer)
    }

    /// Feed typed keys
    ///
    /// With `use_map == false` no mapping applies while these keys are
    /// processed.
    pub fn handle_keys<C>(&mut self, keys: &[Key], use_map: bool, consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.feed(keys, Instant::now(), use_map, consumer)
    }

    /// Feed keys in the flat byte encoding (specials as `CSI group code`)
    pub fn handle_bytes<C>(&mut self, bytes: &[u8], consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.handle_keys(&decode_bytes(bytes), true, consumer)
    }

    /// Feed key notation text, e.g. for `:normal`
    pub fn handle_string<C>(&mut self, text: &str, use_map: bool, consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.handle_keys(&encode(text), use_map, consumer)
    }

    /// Feed a host key press
    ///
    /// Returns whether the key was intercepted. Keys the adapter doesn't
    /// know, and keys the consumer reports as unhandled, are not.
    pub fn handle_keystroke<C>(&mut self, keystroke: &Keystroke, now: Instant, consumer: &mut C) -> bool
    where
        C: KeyConsumer + ?Sized,
    {
        let Some(keys) = keys_from_keystroke(keystroke) else {
            return false;
        };
        self.handle_keys_at(&keys, now, consumer);
        self.processed
    }

    /// Resolve pending keys as if the ambiguity timer fired now
    pub fn handle_timeout<C>(&mut self, consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.timer.cancel();
        self.process(&[], true, true, consumer)
    }

    /// Run the timeout pass if the ambiguity timer is due at `now`
    pub fn tick<C>(&mut self, now: Instant, consumer: &mut C) -> Option<MatchState>
    where
        C: KeyConsumer + ?Sized,
    {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        tracing::trace!("Key timeout with {} pending", self.queue.len());
        Some(self.process(&[], true, true, consumer))
    }

    /// When the host should call [`Mapper::tick`] next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Time left before pending keys are resolved, `None` if nothing waits
    pub fn time_until_timeout(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timer.set_timeout(timeout);
    }

    /// Flush pending keys, e.g. on a mode switch
    pub fn reset(&mut self) {
        self.queue.clear();
        self.resolved = 0;
        self.suppress_mapping = false;
        self.timer.cancel();
        self.showcmd.clear();
    }

    /// Let the next key through without mapping
    pub fn suppress_next_mapping(&mut self) {
        self.suppress_mapping = true;
    }

    pub fn is_mapping_suppressed(&self) -> bool {
        self.suppress_mapping
    }

    pub fn pending_keys(&self) -> Vec<Key> {
        self.queue.iter().copied().collect()
    }

    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Whether the consumer used every key of the last call
    pub fn was_processed(&self) -> bool {
        self.processed
    }

    /// Typed keys of the unfinished command, for the status bar
    pub fn showcmd(&self) -> String {
        self.showcmd.text()
    }

    /// Process genuine input; the timer stays armed only while keys wait
    fn feed<C>(&mut self, keys: &[Key], now: Instant, use_map: bool, consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.timer.arm(now);
        let state = self.process(keys, false, use_map, consumer);
        if state != MatchState::Ambiguous {
            self.timer.cancel();
        }
        state
    }

    fn process<C>(&mut self, keys: &[Key], timeout: bool, use_map: bool, consumer: &mut C) -> MatchState
    where
        C: KeyConsumer + ?Sized,
    {
        self.processed = true;
        self.queue.extend(keys.iter().copied());

        let mut drained = false;
        let mut expansions = 0usize;

        loop {
            while self.resolved > 0 {
                let Some(key) = self.queue.pop_front() else {
                    self.resolved = 0;
                    break;
                };
                self.resolved -= 1;
                self.suppress_mapping = false;
                drained = true;
                self.dispatch(key, consumer);
            }

            if self.queue.is_empty() {
                self.resolved = 0;
                self.showcmd.pending.clear();
                return if drained {
                    MatchState::Done
                } else {
                    MatchState::NoMatch
                };
            }

            let mut expansion = None;
            if use_map && !self.suppress_mapping {
                let pending = self.queue.make_contiguous();
                let result = self.keymap.find_matches(consumer.mode(), pending);

                if result.ambiguous && !timeout {
                    self.showcmd.pending = pending.to_vec();
                    return MatchState::Ambiguous;
                }
                expansion = result.best.map(Expansion::from);
            }

            match expansion {
                Some(m) if m.remap && !m.self_prefixed && expansions >= self.max_remap_depth => {
                    tracing::warn!(
                        "Recursive mapping exceeded depth {}, passing {} through unmapped",
                        self.max_remap_depth,
                        decode_for_display(&m.rhs)
                    );
                    self.resolved = 1;
                }
                Some(m) => {
                    self.queue.drain(..m.lhs_len);
                    for key in m.rhs.iter().rev() {
                        self.queue.push_front(*key);
                    }

                    if !m.remap {
                        self.resolved += m.rhs.len();
                    } else if m.self_prefixed {
                        // The lhs at the front of its own rhs is never expanded again
                        self.resolved += m.lhs_len;
                    } else {
                        expansions += 1;
                    }
                }
                None => self.resolved = 1,
            }
        }
    }

    fn dispatch<C>(&mut self, key: Key, consumer: &mut C)
    where
        C: KeyConsumer + ?Sized,
    {
        let result = consumer.handle_key(key);
        tracing::trace!(
            "{}: key[{:#x} {}] -> {:?}",
            consumer.mode(),
            key.code(),
            decode_for_display(&[key]),
            result
        );

        match result {
            KeyResult::Complete => self.showcmd.clear(),
            KeyResult::AwaitMore => self.showcmd.committed.push(key),
            KeyResult::AwaitLiteral => {
                self.suppress_mapping = true;
                self.showcmd.committed.push(key);
            }
            KeyResult::Unhandled => {
                self.processed = false;
                self.showcmd.clear();
            }
        }
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(Keymap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Mode = Mode('t');

    fn mapper() -> Mapper {
        let mut keymap = Keymap::new();
        keymap.insert(T, "a", "[a]", false);
        keymap.insert(T, "b", "[b]", false);
        keymap.insert(T, "foobar", "[baz]", false);
        Mapper::new(keymap)
    }

    fn feed(mapper: &mut Mapper, text: &str) -> String {
        let mut recorder = KeyRecorder::new(T);
        mapper.handle_string(text, true, &mut recorder);
        recorder.display()
    }

    #[test]
    fn test_match_states() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);

        assert_eq!(
            mapper.handle_keys(&encode("a"), true, &mut recorder),
            MatchState::Done
        );
        assert_eq!(
            mapper.handle_keys(&encode("foo"), true, &mut recorder),
            MatchState::Ambiguous
        );
        assert_eq!(mapper.handle_timeout(&mut recorder), MatchState::Done);
        assert_eq!(mapper.handle_timeout(&mut recorder), MatchState::NoMatch);
        assert_eq!(recorder.display(), "[a]foo");
    }

    #[test]
    fn test_unmapped_keys_are_done() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        assert_eq!(
            mapper.handle_keys(&encode("xyz"), true, &mut recorder),
            MatchState::Done
        );
        assert_eq!(recorder.display(), "xyz");
    }

    #[test]
    fn test_resolved_never_exceeds_queue() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        for text in ["f", "o", "o", "x", "a"] {
            mapper.handle_keys(&encode(text), true, &mut recorder);
            assert!(mapper.resolved_count() <= mapper.pending_keys().len());
        }
        assert_eq!(recorder.display(), "foox[a]");
    }

    #[test]
    fn test_timer_live_only_while_ambiguous() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        let now = Instant::now();

        mapper.handle_keys_at(&encode("a"), now, &mut recorder);
        assert!(mapper.next_deadline().is_none());

        mapper.handle_keys_at(&encode("fo"), now, &mut recorder);
        assert_eq!(mapper.next_deadline(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_tick_before_and_after_deadline() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        let now = Instant::now();

        mapper.handle_keys_at(&encode("foo"), now, &mut recorder);
        assert_eq!(mapper.tick(now + Duration::from_millis(500), &mut recorder), None);
        assert!(recorder.keys.is_empty());

        assert_eq!(
            mapper.tick(now + Duration::from_millis(1000), &mut recorder),
            Some(MatchState::Done)
        );
        assert_eq!(recorder.display(), "foo");
        assert!(!mapper.is_pending());
    }

    #[test]
    fn test_new_key_restarts_timer() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        let now = Instant::now();

        mapper.handle_keys_at(&encode("f"), now, &mut recorder);
        mapper.handle_keys_at(&encode("o"), now + Duration::from_millis(800), &mut recorder);

        assert_eq!(mapper.tick(now + Duration::from_millis(1200), &mut recorder), None);
        assert!(mapper
            .tick(now + Duration::from_millis(1800), &mut recorder)
            .is_some());
        assert_eq!(recorder.display(), "fo");
    }

    #[test]
    fn test_timeout_prefers_shorter_match() {
        let mut keymap = Keymap::new();
        keymap.insert(T, "g", "[g]", false);
        keymap.insert(T, "gh", "[gh]", false);
        let mut mapper = Mapper::new(keymap);
        let mut recorder = KeyRecorder::new(T);

        assert_eq!(
            mapper.handle_keys(&encode("g"), true, &mut recorder),
            MatchState::Ambiguous
        );
        mapper.handle_timeout(&mut recorder);
        assert_eq!(recorder.display(), "[g]");
    }

    #[test]
    fn test_reset_flushes_queue() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        mapper.handle_keys(&encode("foob"), true, &mut recorder);
        assert!(mapper.is_pending());

        mapper.reset();
        assert!(!mapper.is_pending());
        assert!(mapper.next_deadline().is_none());
        assert_eq!(mapper.showcmd(), "");

        assert_eq!(feed(&mut mapper, "ar"), "ar");
    }

    #[test]
    fn test_showcmd_while_ambiguous() {
        let mut mapper = mapper();
        let mut recorder = KeyRecorder::new(T);
        mapper.handle_keys(&encode("foo"), true, &mut recorder);
        assert_eq!(mapper.showcmd(), "foo");

        mapper.handle_keys(&encode("bar"), true, &mut recorder);
        assert_eq!(mapper.showcmd(), "");
    }

    #[test]
    fn test_showcmd_keeps_last_characters() {
        let mut keymap = Keymap::new();
        keymap.insert(T, "0123456789abcdef", "x", false);
        let mut mapper = Mapper::new(keymap);
        let mut recorder = KeyRecorder::new(T);

        mapper.handle_keys(&encode("0123456789abc"), true, &mut recorder);
        assert_eq!(mapper.showcmd(), "3456789abc");
    }

    #[test]
    fn test_handle_bytes_decodes_specials() {
        let mut keymap = Keymap::new();
        keymap.insert(T, "<Up>", "[up]", false);
        let mut mapper = Mapper::new(keymap);
        let mut recorder = KeyRecorder::new(T);

        mapper.handle_bytes(&[0x80, b'k', b'u', b'x'], &mut recorder);
        assert_eq!(recorder.display(), "[up]x");
    }

    #[test]
    fn test_execute_commands() {
        let mut mapper = Mapper::default();
        let mut recorder = KeyRecorder::new(Mode::NORMAL);
        let map = MapCommand::parse("nnoremap x [x]").unwrap();
        let unmap = MapCommand::parse("nunmap x").unwrap();

        assert!(mapper.execute(&map));
        mapper.handle_string("x", true, &mut recorder);
        assert_eq!(recorder.display(), "[x]");

        assert!(mapper.execute(&unmap));
        assert!(!mapper.execute(&unmap));
        mapper.handle_string("x", true, &mut recorder);
        assert_eq!(recorder.display(), "[x]x");
    }
}
