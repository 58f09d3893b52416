//! Server browser snapshots.

use std::hash::{Hash, Hasher};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::AppId;

// ---------------------------------------------------------------------------
// GameServerItem
// ---------------------------------------------------------------------------

/// The raw server record as the native server browser reports it.
///
/// `ip` is a host-order `u32` (`0x7f000001` is 127.0.0.1). Everything else
/// is carried over field for field into [`ServerInfo`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameServerItem {
    pub ip: u32,
    pub connection_port: u16,
    pub query_port: u16,
    pub server_name: String,
    pub ping: i32,
    pub game_dir: String,
    pub map: String,
    pub game_description: String,
    pub app_id: u32,
    pub players: i32,
    pub max_players: i32,
    pub bot_players: i32,
    pub password: bool,
    pub secure: bool,
    pub time_last_played: u32,
    pub server_version: i32,
    pub game_tags: String,
    pub server_id: u64,
}

// ---------------------------------------------------------------------------
// ServerInfo
// ---------------------------------------------------------------------------

/// Immutable snapshot of one discovered game server.
///
/// # Equality
///
/// Two snapshots are equal when their address, server id, connection port
/// and query port match. Ping, player counts, map and every other field are
/// ignored. This lets a refreshed snapshot of the same server compare equal
/// to the stale one, but it also means `==` is weaker than a field-by-field
/// comparison. Code that needs to detect a changed snapshot must compare
/// the fields it cares about.
///
/// # Tags
///
/// [`tags`](Self::tags) splits the comma-delimited tag string the first time
/// it is called and caches the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    name: String,
    ping: i32,
    game_dir: String,
    map: String,
    description: String,
    app_id: AppId,
    players: i32,
    max_players: i32,
    bot_players: i32,
    passworded: bool,
    secure: bool,
    last_time_played: u32,
    version: i32,
    tag_string: String,
    server_id: u64,
    address: Ipv4Addr,
    connection_port: u16,
    query_port: u16,

    #[serde(skip)]
    tags: OnceLock<Vec<String>>,
}

impl ServerInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Round-trip time in milliseconds at the moment the snapshot was taken.
    pub fn ping(&self) -> i32 {
        self.ping
    }

    pub fn game_dir(&self) -> &str {
        &self.game_dir
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    pub fn players(&self) -> i32 {
        self.players
    }

    pub fn max_players(&self) -> i32 {
        self.max_players
    }

    pub fn bot_players(&self) -> i32 {
        self.bot_players
    }

    pub fn passworded(&self) -> bool {
        self.passworded
    }

    /// Whether the server runs anti-cheat.
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Unix time the local user last played here, 0 if never.
    pub fn last_time_played(&self) -> u32 {
        self.last_time_played
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// The raw comma-delimited tag string.
    pub fn tag_string(&self) -> &str {
        &self.tag_string
    }

    pub fn server_id(&self) -> u64 {
        self.server_id
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn connection_port(&self) -> u16 {
        self.connection_port
    }

    pub fn query_port(&self) -> u16 {
        self.query_port
    }

    /// Address game clients connect to.
    pub fn connection_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.connection_port)
    }

    /// Address that answers server queries such as `A2S_RULES`.
    pub fn query_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.query_port)
    }

    /// Individual tags, split from the tag string on first access.
    ///
    /// An empty tag string yields no tags. Empty segments between commas
    /// are kept as empty strings.
    pub fn tags(&self) -> &[String] {
        self.tags.get_or_init(|| {
            if self.tag_string.is_empty() {
                Vec::new()
            } else {
                self.tag_string.split(',').map(str::to_owned).collect()
            }
        })
    }

    /// Returns `true` if `tag` is one of this server's tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

impl From<GameServerItem> for ServerInfo {
    fn from(item: GameServerItem) -> Self {
        Self {
            address: Ipv4Addr::from(item.ip),
            connection_port: item.connection_port,
            query_port: item.query_port,
            name: item.server_name,
            ping: item.ping,
            game_dir: item.game_dir,
            map: item.map,
            description: item.game_description,
            app_id: AppId(item.app_id),
            players: item.players,
            max_players: item.max_players,
            bot_players: item.bot_players,
            passworded: item.password,
            secure: item.secure,
            last_time_played: item.time_last_played,
            version: item.server_version,
            tag_string: item.game_tags,
            server_id: item.server_id,
            tags: OnceLock::new(),
        }
    }
}

impl PartialEq for ServerInfo {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.server_id == other.server_id
            && self.connection_port == other.connection_port
            && self.query_port == other.query_port
    }
}

impl Eq for ServerInfo {}

// Must hash exactly the fields `eq` compares.
impl Hash for ServerInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.server_id.hash(state);
        self.connection_port.hash(state);
        self.query_port.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn item(tags: &str) -> GameServerItem {
        GameServerItem {
            ip: 0x0a00_0001,
            connection_port: 27015,
            query_port: 27016,
            server_name: "Dust Bowl".into(),
            ping: 40,
            map: "de_dust".into(),
            players: 10,
            max_players: 24,
            game_tags: tags.into(),
            server_id: 900,
            ..GameServerItem::default()
        }
    }

    #[test]
    fn test_from_item_converts_host_order_ip() {
        let info = ServerInfo::from(item(""));
        assert_eq!(info.address(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(
            info.query_addr(),
            SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 27016)
        );
        assert_eq!(info.connection_addr().port(), 27015);
    }

    #[test]
    fn test_from_item_copies_fields() {
        let info = ServerInfo::from(item("pvp"));
        assert_eq!(info.name(), "Dust Bowl");
        assert_eq!(info.map(), "de_dust");
        assert_eq!(info.players(), 10);
        assert_eq!(info.max_players(), 24);
        assert_eq!(info.server_id(), 900);
        assert_eq!(info.tag_string(), "pvp");
    }

    #[test]
    fn test_tags_splits_on_comma() {
        let info = ServerInfo::from(item("a,b,c"));
        assert_eq!(info.tags(), &["a", "b", "c"]);
    }

    #[test]
    fn test_tags_empty_string_returns_no_tags() {
        let info = ServerInfo::from(item(""));
        assert!(info.tags().is_empty());
    }

    #[test]
    fn test_tags_keeps_empty_segments() {
        let info = ServerInfo::from(item("a,,b"));
        assert_eq!(info.tags(), &["a", "", "b"]);
    }

    #[test]
    fn test_tags_is_cached_across_calls() {
        let info = ServerInfo::from(item("x,y"));
        let first = info.tags().as_ptr();
        let second = info.tags().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_has_tag() {
        let info = ServerInfo::from(item("secure,hardcore"));
        assert!(info.has_tag("hardcore"));
        assert!(!info.has_tag("casual"));
    }

    #[test]
    fn test_eq_ignores_non_key_fields() {
        let a = ServerInfo::from(item("a"));
        let mut changed = item("b");
        changed.ping = 300;
        changed.players = 0;
        changed.server_name = "Renamed".into();
        let b = ServerInfo::from(changed);

        assert_eq!(a, b);
    }

    #[test]
    fn test_eq_differs_on_query_port() {
        let a = ServerInfo::from(item(""));
        let mut other = item("");
        other.query_port = 27017;
        assert_ne!(a, ServerInfo::from(other));
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let mut refreshed = item("");
        refreshed.ping = 999;

        let mut set = HashSet::new();
        set.insert(ServerInfo::from(item("")));
        assert!(!set.insert(ServerInfo::from(refreshed)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_deserialized_snapshot_splits_tags_lazily() {
        let info = ServerInfo::from(item("a,b"));
        let json = serde_json::to_string(&info).unwrap();
        let back: ServerInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tags(), &["a", "b"]);
    }
}
