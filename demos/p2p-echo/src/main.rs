//! Echo over the loopback native layer.
//!
//! A host and a guest client share one in-memory network. The guest opens a
//! session by sending, the host accepts the request and echoes every packet
//! back. Both clients are driven by their own callback pump.
//!
//! ```text
//! RUST_LOG=debug cargo run -p p2p-echo
//! ```

use std::sync::Arc;
use std::time::Duration;

use platkit::prelude::*;
use platkit::{LoopbackHub, LoopbackNative};

const HOST: PeerId = PeerId(1);
const GUEST: PeerId = PeerId(2);
const ROUNDS: u32 = 5;

type Client = Arc<PlatformClient<LoopbackNative>>;

fn start(hub: &LoopbackHub, id: PeerId) -> Result<Client, PlatformError> {
    let client = PlatformClient::builder()
        .pump_rate_hz(120)
        .build(Arc::new(hub.node(id)))?;
    Ok(Arc::new(client))
}

/// Accepts every session request and echoes packets until `rounds` packets
/// have been echoed.
async fn run_host(host: Client, rounds: u32) {
    let mut events = host.p2p().subscribe();
    let mut echoed = 0;
    let mut ticker = tokio::time::interval(Duration::from_millis(5));

    while echoed < rounds {
        tokio::select! {
            Ok(event) = events.recv() => {
                if let P2pEvent::SessionRequest(peer) = event {
                    tracing::info!(%peer, "accepting session");
                    host.p2p().accept_session(peer);
                }
            }
            _ = ticker.tick() => {
                while let Some(packet) = host.p2p().read_packet(0) {
                    host.p2p().send_packet(packet.sender(), packet.data(), SendOptions::default());
                    echoed += 1;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), PlatformError> {
    platkit::telemetry::init_tracing("info,platkit_p2p=debug");

    let hub = LoopbackHub::new();
    let host = start(&hub, HOST)?;
    let guest = start(&hub, GUEST)?;
    let host_pump = host.spawn_pump();
    let guest_pump = guest.spawn_pump();

    let host_task = tokio::spawn(run_host(Arc::clone(&host), ROUNDS));

    for round in 0..ROUNDS {
        let message = format!("ping {round}");
        guest
            .p2p()
            .send_packet(HOST, message.as_bytes(), SendOptions::default());

        loop {
            if let Some(reply) = guest.p2p().read_packet(0) {
                tracing::info!(
                    from = %reply.sender(),
                    reply = %String::from_utf8_lossy(reply.data()),
                    "echo received"
                );
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    if let Err(err) = host_task.await {
        tracing::warn!(%err, "host task failed");
    }
    for pump in [host_pump, guest_pump].into_iter().flatten() {
        pump.stop().await;
    }
    for client in [host, guest] {
        if let Ok(client) = Arc::try_unwrap(client) {
            client.shutdown();
        }
    }
    Ok(())
}
