//! In-memory native layer.
//!
//! A [`LoopbackHub`] is a tiny simulated network: every [`LoopbackNative`]
//! created from it is one node addressed by a [`PeerId`], and packets sent
//! between nodes land in the receiver's inbox without touching a socket.
//!
//! The simulation follows the observable behaviour of the real SDK:
//!
//! - The first packet from an unknown peer is held back and a
//!   [`Callback::P2pSessionRequest`] is posted. Accepting the session
//!   releases the held packets; closing it drops them.
//! - Sending to a peer that isn't on the hub succeeds immediately and later
//!   posts [`Callback::P2pSessionConnectFail`] to the sender.
//! - Async calls complete after a configurable number of completion polls.
//!
//! All utility getters read from [`LoopbackUtils`], which tests mutate via
//! [`LoopbackNative::with_utils`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use platkit_types::{
    AsyncCallHandle, FileSignature, GamepadTextInputLineMode,
    GamepadTextInputMode, NotificationPosition, PeerId, SendType,
};

use crate::{
    CallState, Callback, CallbackResult, CheckFileSignatureResult,
    NativeCallbacks, NativeP2p, NativeUtils,
};

/// Largest payload accepted for unreliable sends.
const MAX_UNRELIABLE_LEN: usize = 1200;

/// Largest payload accepted for reliable sends.
const MAX_RELIABLE_LEN: usize = 1024 * 1024;

/// Native error code posted when the remote peer doesn't exist.
const ERROR_TARGET_NOT_RUNNING: u8 = 1;

// ---------------------------------------------------------------------------
// Public test-facing types
// ---------------------------------------------------------------------------

/// A packet the node handed to the simulated network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    pub to: PeerId,
    pub data: Vec<u8>,
    pub send_type: SendType,
    pub channel: i32,
}

/// Host state the utility getters report.
///
/// Every field is public so a test can shape the "machine" it runs on.
#[derive(Debug, Clone)]
pub struct LoopbackUtils {
    pub seconds_since_app_active: u32,
    pub seconds_since_computer_active: u32,
    pub universe: i32,
    pub server_time: u32,
    pub ip_country: String,
    pub images: HashMap<i32, (u32, u32, Vec<u8>)>,
    pub battery_percent: u8,
    pub app_id: u32,
    /// The last position pushed through the native setter.
    pub overlay_position: NotificationPosition,
    pub overlay_inset: (i32, i32),
    pub overlay_enabled: bool,
    pub overlay_needs_present: bool,
    pub gamepad_text: Option<String>,
    /// When set, the gamepad text copy fails even though a length is
    /// reported.
    pub gamepad_text_fetch_fails: bool,
    pub gamepad_dialog_open: bool,
    pub ui_language: String,
    pub running_in_vr: bool,
    pub big_picture: bool,
    pub vr_dashboard_started: bool,
    pub vr_headset_streaming: bool,
    pub file_signatures: HashMap<String, FileSignature>,
    /// How many completion polls an async call stays pending for.
    pub call_latency_polls: u32,
    /// When set, async calls complete with the failure flag raised.
    pub fail_calls: bool,
}

impl Default for LoopbackUtils {
    fn default() -> Self {
        Self {
            seconds_since_app_active: 0,
            seconds_since_computer_active: 0,
            universe: 1,
            server_time: 0,
            ip_country: "US".into(),
            images: HashMap::new(),
            battery_percent: 255,
            app_id: 480,
            overlay_position: NotificationPosition::BottomRight,
            overlay_inset: (0, 0),
            overlay_enabled: false,
            overlay_needs_present: false,
            gamepad_text: None,
            gamepad_text_fetch_fails: false,
            gamepad_dialog_open: false,
            ui_language: "english".into(),
            running_in_vr: false,
            big_picture: false,
            vr_dashboard_started: false,
            vr_headset_streaming: true,
            file_signatures: HashMap::new(),
            call_latency_polls: 1,
            fail_calls: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Hub and node state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PendingCall {
    callback_id: i32,
    payload: Vec<u8>,
    polls_left: u32,
    failed: bool,
}

#[derive(Debug, Default)]
struct Node {
    /// Peers we have an established session with.
    sessions: HashSet<PeerId>,
    /// Peers whose session request has been posted but not answered.
    requested: HashSet<PeerId>,
    /// Packets held back until the sender's session is accepted.
    held: HashMap<PeerId, Vec<(i32, Vec<u8>)>>,
    inbox: HashMap<i32, VecDeque<(PeerId, Vec<u8>)>>,
    callbacks: VecDeque<Callback>,
    sent: Vec<SentPacket>,
    utils: LoopbackUtils,
    calls: HashMap<u64, PendingCall>,
    next_call: u64,
}

impl Node {
    fn deliver(&mut self, from: PeerId, channel: i32, data: Vec<u8>) {
        if self.sessions.contains(&from) {
            self.inbox.entry(channel).or_default().push_back((from, data));
            return;
        }
        self.held.entry(from).or_default().push((channel, data));
        if self.requested.insert(from) {
            self.callbacks
                .push_back(Callback::P2pSessionRequest { remote: from });
        }
    }

    fn issue_call(&mut self, callback_id: i32, payload: Vec<u8>) -> AsyncCallHandle {
        self.next_call += 1;
        let handle = self.next_call;
        self.calls.insert(
            handle,
            PendingCall {
                callback_id,
                payload,
                polls_left: self.utils.call_latency_polls,
                failed: self.utils.fail_calls,
            },
        );
        AsyncCallHandle(handle)
    }
}

/// A simulated network that [`LoopbackNative`] nodes attach to.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    nodes: Arc<Mutex<HashMap<PeerId, Node>>>,
}

impl LoopbackHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a node with the given identity and returns its native
    /// handle. Re-attaching an existing id returns a handle to the same
    /// node.
    pub fn node(&self, id: PeerId) -> LoopbackNative {
        self.nodes.lock().entry(id).or_default();
        LoopbackNative {
            id,
            hub: self.clone(),
        }
    }

    /// Detaches a node. Later sends to it fail with a connect-fail callback.
    ///
    /// Handles to the removed node keep working against a detached empty
    /// state; they never re-attach it. Call [`node`](Self::node) to attach
    /// the id again.
    pub fn remove(&self, id: PeerId) {
        self.nodes.lock().remove(&id);
    }
}

/// One node on a [`LoopbackHub`], implementing every native trait.
#[derive(Debug, Clone)]
pub struct LoopbackNative {
    id: PeerId,
    hub: LoopbackHub,
}

impl LoopbackNative {
    /// A node on a private hub of its own.
    pub fn standalone(id: PeerId) -> Self {
        LoopbackHub::new().node(id)
    }

    /// Runs `f` against this node's state. A node removed from the hub gets
    /// a throwaway empty state, so the hub never sees it again.
    fn with_node<R>(&self, f: impl FnOnce(&mut Node) -> R) -> R {
        let mut nodes = self.hub.nodes.lock();
        match nodes.get_mut(&self.id) {
            Some(node) => f(node),
            None => f(&mut Node::default()),
        }
    }

    /// Reads or mutates the simulated host state.
    pub fn with_utils<R>(&self, f: impl FnOnce(&mut LoopbackUtils) -> R) -> R {
        self.with_node(|node| f(&mut node.utils))
    }

    /// Places a packet straight into this node's receive path, as if `from`
    /// had sent it.
    pub fn inject_packet(&self, from: PeerId, channel: i32, data: &[u8]) {
        self.with_node(|node| node.deliver(from, channel, data.to_vec()));
    }

    /// Posts a raw callback to this node's queue.
    pub fn push_callback(&self, callback: Callback) {
        self.with_node(|node| node.callbacks.push_back(callback));
    }

    /// Everything this node has sent so far.
    pub fn sent_packets(&self) -> Vec<SentPacket> {
        self.with_node(|node| node.sent.clone())
    }

    /// Number of async calls issued but not yet collected.
    pub fn outstanding_calls(&self) -> usize {
        self.with_node(|node| node.calls.len())
    }
}

// ---------------------------------------------------------------------------
// NativeP2p
// ---------------------------------------------------------------------------

impl NativeP2p for LoopbackNative {
    fn accept_session_with_user(&self, user: PeerId) -> bool {
        self.with_node(|node| {
            if node.sessions.contains(&user) {
                return true;
            }
            if !node.requested.remove(&user) {
                return false;
            }
            node.sessions.insert(user);
            for (channel, data) in node.held.remove(&user).unwrap_or_default() {
                node.inbox.entry(channel).or_default().push_back((user, data));
            }
            true
        })
    }

    fn close_session_with_user(&self, user: PeerId) -> bool {
        self.with_node(|node| {
            let had_session = node.sessions.remove(&user);
            let had_request = node.requested.remove(&user);
            node.held.remove(&user);
            had_session || had_request
        })
    }

    fn is_packet_available(&self, channel: i32) -> Option<u32> {
        self.with_node(|node| {
            node.inbox
                .get(&channel)
                .and_then(|queue| queue.front())
                .map(|(_, data)| data.len() as u32)
        })
    }

    fn read_packet(&self, dest: &mut [u8], channel: i32) -> Option<(u32, PeerId)> {
        self.with_node(|node| {
            let queue = node.inbox.get_mut(&channel)?;
            // A buffer that is too small leaves the packet queued.
            if queue.front()?.1.len() > dest.len() {
                return None;
            }
            let (from, data) = queue.pop_front()?;
            dest[..data.len()].copy_from_slice(&data);
            Some((data.len() as u32, from))
        })
    }

    fn send_packet(
        &self,
        remote: PeerId,
        data: &[u8],
        send_type: SendType,
        channel: i32,
    ) -> bool {
        let limit = if send_type.is_reliable() {
            MAX_RELIABLE_LEN
        } else {
            MAX_UNRELIABLE_LEN
        };
        if data.is_empty() || data.len() > limit {
            return false;
        }

        let mut nodes = self.hub.nodes.lock();
        let reachable = nodes.contains_key(&remote);

        let mut detached = Node::default();
        let me = match nodes.get_mut(&self.id) {
            Some(node) => node,
            None => &mut detached,
        };
        me.sent.push(SentPacket {
            to: remote,
            data: data.to_vec(),
            send_type,
            channel,
        });
        if !reachable {
            tracing::trace!(from = %self.id, to = %remote, "loopback target missing");
            me.callbacks.push_back(Callback::P2pSessionConnectFail {
                remote,
                error: ERROR_TARGET_NOT_RUNNING,
            });
            return true;
        }
        // Sending opens our side of the session.
        me.sessions.insert(remote);
        me.requested.remove(&remote);

        if let Some(target) = nodes.get_mut(&remote) {
            target.deliver(self.id, channel, data.to_vec());
        }
        true
    }
}

// ---------------------------------------------------------------------------
// NativeUtils
// ---------------------------------------------------------------------------

impl NativeUtils for LoopbackNative {
    fn seconds_since_app_active(&self) -> u32 {
        self.with_utils(|u| u.seconds_since_app_active)
    }

    fn seconds_since_computer_active(&self) -> u32 {
        self.with_utils(|u| u.seconds_since_computer_active)
    }

    fn connected_universe(&self) -> i32 {
        self.with_utils(|u| u.universe)
    }

    fn server_real_time(&self) -> u32 {
        self.with_utils(|u| u.server_time)
    }

    fn ip_country(&self) -> String {
        self.with_utils(|u| u.ip_country.clone())
    }

    fn image_size(&self, image: i32) -> Option<(u32, u32)> {
        self.with_utils(|u| u.images.get(&image).map(|(w, h, _)| (*w, *h)))
    }

    fn image_rgba(&self, image: i32, dest: &mut [u8]) -> bool {
        self.with_utils(|u| match u.images.get(&image) {
            Some((_, _, rgba)) if rgba.len() == dest.len() => {
                dest.copy_from_slice(rgba);
                true
            }
            _ => false,
        })
    }

    fn current_battery_power(&self) -> u8 {
        self.with_utils(|u| u.battery_percent)
    }

    fn app_id(&self) -> u32 {
        self.with_utils(|u| u.app_id)
    }

    fn set_overlay_notification_position(&self, position: NotificationPosition) {
        self.with_utils(|u| u.overlay_position = position);
    }

    fn set_overlay_notification_inset(&self, horizontal: i32, vertical: i32) {
        self.with_utils(|u| u.overlay_inset = (horizontal, vertical));
    }

    fn is_overlay_enabled(&self) -> bool {
        self.with_utils(|u| u.overlay_enabled)
    }

    fn overlay_needs_present(&self) -> bool {
        self.with_utils(|u| u.overlay_needs_present)
    }

    fn is_api_call_completed(&self, call: AsyncCallHandle) -> CallState {
        self.with_node(|node| match node.calls.get_mut(&call.0) {
            None => CallState::Completed { failed: true },
            Some(pending) if pending.polls_left > 0 => {
                pending.polls_left -= 1;
                if pending.polls_left == 0 {
                    CallState::Completed {
                        failed: pending.failed,
                    }
                } else {
                    CallState::Pending
                }
            }
            Some(pending) => CallState::Completed {
                failed: pending.failed,
            },
        })
    }

    fn api_call_result(
        &self,
        call: AsyncCallHandle,
        dest: &mut [u8],
        expected_callback: i32,
    ) -> Option<bool> {
        self.with_node(|node| {
            let pending = node.calls.get(&call.0)?;
            if pending.polls_left > 0
                || pending.callback_id != expected_callback
                || pending.payload.len() != dest.len()
            {
                return None;
            }
            let pending = node.calls.remove(&call.0)?;
            dest.copy_from_slice(&pending.payload);
            Some(pending.failed)
        })
    }

    fn check_file_signature(&self, path: &str) -> AsyncCallHandle {
        if path.is_empty() {
            return AsyncCallHandle::INVALID;
        }
        self.with_node(|node| {
            let signature = node
                .utils
                .file_signatures
                .get(path)
                .copied()
                .unwrap_or(FileSignature::FileNotFound);
            let payload = (signature as i32).to_le_bytes().to_vec();
            debug_assert_eq!(payload.len(), CheckFileSignatureResult::SIZE);
            node.issue_call(CheckFileSignatureResult::CALLBACK_ID, payload)
        })
    }

    fn show_gamepad_text_input(
        &self,
        _mode: GamepadTextInputMode,
        _line_mode: GamepadTextInputLineMode,
        _description: &str,
        max_chars: u32,
        existing_text: &str,
    ) -> bool {
        self.with_utils(|u| {
            if u.gamepad_dialog_open || max_chars == 0 {
                return false;
            }
            u.gamepad_dialog_open = true;
            u.gamepad_text = Some(existing_text.to_owned());
            true
        })
    }

    fn entered_gamepad_text_length(&self) -> u32 {
        self.with_utils(|u| match &u.gamepad_text {
            Some(text) => text.len() as u32 + 1,
            None => 0,
        })
    }

    fn entered_gamepad_text(&self, dest: &mut [u8]) -> bool {
        self.with_utils(|u| {
            if u.gamepad_text_fetch_fails {
                return false;
            }
            let Some(text) = &u.gamepad_text else {
                return false;
            };
            let bytes = text.as_bytes();
            if dest.len() < bytes.len() + 1 {
                return false;
            }
            dest[..bytes.len()].copy_from_slice(bytes);
            dest[bytes.len()] = 0;
            true
        })
    }

    fn ui_language(&self) -> String {
        self.with_utils(|u| u.ui_language.clone())
    }

    fn is_running_in_vr(&self) -> bool {
        self.with_utils(|u| u.running_in_vr)
    }

    fn is_in_big_picture_mode(&self) -> bool {
        self.with_utils(|u| u.big_picture)
    }

    fn start_vr_dashboard(&self) {
        self.with_utils(|u| u.vr_dashboard_started = true);
    }

    fn is_vr_headset_streaming_enabled(&self) -> bool {
        self.with_utils(|u| u.vr_headset_streaming)
    }

    fn set_vr_headset_streaming_enabled(&self, enabled: bool) {
        self.with_utils(|u| u.vr_headset_streaming = enabled);
    }
}

// ---------------------------------------------------------------------------
// NativeCallbacks
// ---------------------------------------------------------------------------

impl NativeCallbacks for LoopbackNative {
    fn next_callback(&self) -> Option<Callback> {
        self.with_node(|node| node.callbacks.pop_front())
    }
}
