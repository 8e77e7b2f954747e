//! Broadcast loop
//!
//! Polls every registered connection and relays each received payload to all
//! other connections.

use log::{debug, info, warn};
use std::io::{self, ErrorKind};
use std::time::Duration;

use crate::client::{ClientRegistry, ConnectionId, SharedRegistry, Transport};

/// Outcome of a single relay pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Non-empty payloads read from sources.
    pub received: usize,
    /// Successful deliveries to targets.
    pub delivered: usize,
    /// Connections removed at the end of the pass.
    pub removed: Vec<ConnectionId>,
}

impl PassReport {
    pub fn is_idle(&self) -> bool {
        self.received == 0 && self.removed.is_empty()
    }
}

/// Runs relay passes forever, sleeping `poll_interval` after a pass that
/// received nothing.
pub async fn run_broadcast_loop<T: Transport>(
    registry: SharedRegistry<T>,
    buffer_size: usize,
    poll_interval: Duration,
) {
    let mut buf = vec![0u8; buffer_size];

    loop {
        let report = {
            let mut clients = registry.lock().await;
            relay_pass(&mut *clients, &mut buf)
        };

        if report.is_idle() {
            tokio::time::sleep(poll_interval).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Performs one pass over a snapshot of the registry.
///
/// Each connection gets one receive attempt. A payload is written verbatim to
/// every other live connection. Connections that closed, failed to receive, or
/// failed a send are removed once the pass is over.
pub fn relay_pass<T: Transport>(registry: &mut ClientRegistry<T>, buf: &mut [u8]) -> PassReport {
    let mut report = PassReport::default();
    if registry.is_empty() {
        return report;
    }

    let mut dead: Vec<ConnectionId> = Vec::new();

    for id in registry.ids() {
        if dead.contains(&id) {
            continue;
        }
        let Some(source) = registry.get(id) else {
            continue;
        };

        let n = match source.try_receive(buf) {
            Ok(0) => {
                info!("Client {} disconnected", source.peer_addr());
                dead.push(id);
                continue;
            }
            Ok(n) => n,
            Err(ref e) if is_not_ready(e) => continue,
            Err(e) => {
                warn!("Failed to receive from {}: {}", source.peer_addr(), e);
                dead.push(id);
                continue;
            }
        };

        report.received += 1;
        let payload = &buf[..n];
        debug!("Relaying {} bytes from {}", n, source.peer_addr());

        for (target_id, target) in registry.others(id) {
            if dead.contains(&target_id) {
                continue;
            }
            match send_all(target, payload) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Failed to send to {}: {}", target.peer_addr(), e);
                    dead.push(target_id);
                }
            }
        }
    }

    for id in dead {
        if let Some(conn) = registry.remove(id) {
            debug!("Removed {} ({} clients left)", conn.peer_addr(), registry.len());
            report.removed.push(id);
        }
    }

    report
}

/// Writes the whole payload without waiting. A socket that cannot take all of
/// it right now counts as a failed send.
fn send_all<T: Transport>(target: &T, mut payload: &[u8]) -> io::Result<()> {
    while !payload.is_empty() {
        match target.try_send(payload) {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(n) => payload = &payload[n..],
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn is_not_ready(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::net::SocketAddr;

    /// In-memory peer: queued inbound reads and a record of every write.
    struct FakePeer {
        addr: SocketAddr,
        inbound: RefCell<VecDeque<io::Result<Vec<u8>>>>,
        sent: RefCell<Vec<Vec<u8>>>,
        fail_sends: bool,
        send_limit: Option<usize>,
        /// Bytes the socket buffer still takes before it reports `WouldBlock`.
        capacity: RefCell<Option<usize>>,
    }

    impl FakePeer {
        fn new(port: u16) -> Self {
            Self {
                addr: SocketAddr::from(([127, 0, 0, 1], port)),
                inbound: RefCell::new(VecDeque::new()),
                sent: RefCell::new(Vec::new()),
                fail_sends: false,
                send_limit: None,
                capacity: RefCell::new(None),
            }
        }

        fn backed_up(self, capacity: usize) -> Self {
            *self.capacity.borrow_mut() = Some(capacity);
            self
        }

        fn with_inbound(self, data: &[u8]) -> Self {
            self.inbound.borrow_mut().push_back(Ok(data.to_vec()));
            self
        }

        fn closed(self) -> Self {
            self.inbound.borrow_mut().push_back(Ok(Vec::new()));
            self
        }

        fn broken(mut self) -> Self {
            self.fail_sends = true;
            self
        }

        fn sent(&self) -> Vec<Vec<u8>> {
            self.sent.borrow().clone()
        }
    }

    impl Transport for FakePeer {
        fn try_receive(&self, buf: &mut [u8]) -> io::Result<usize> {
            match self.inbound.borrow_mut().pop_front() {
                Some(Ok(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(ErrorKind::WouldBlock.into()),
            }
        }

        fn try_send(&self, payload: &[u8]) -> io::Result<usize> {
            if self.fail_sends {
                return Err(ErrorKind::BrokenPipe.into());
            }
            let mut n = self.send_limit.map_or(payload.len(), |limit| limit.min(payload.len()));
            if let Some(room) = self.capacity.borrow_mut().as_mut() {
                if *room == 0 {
                    return Err(ErrorKind::WouldBlock.into());
                }
                n = n.min(*room);
                *room -= n;
            }
            self.sent.borrow_mut().push(payload[..n].to_vec());
            Ok(n)
        }

        fn peer_addr(&self) -> SocketAddr {
            self.addr
        }
    }

    fn pass(registry: &mut ClientRegistry<FakePeer>) -> PassReport {
        let mut buf = vec![0u8; 4096];
        relay_pass(registry, &mut buf)
    }

    #[test]
    fn test_empty_registry_is_a_no_op() {
        let mut registry: ClientRegistry<FakePeer> = ClientRegistry::new();
        assert_eq!(pass(&mut registry), PassReport::default());
    }

    #[test]
    fn test_payload_reaches_every_other_peer_but_not_the_sender() {
        let mut registry = ClientRegistry::new();
        let a = registry.register(FakePeer::new(1).with_inbound(b"alice:hello"));
        let b = registry.register(FakePeer::new(2));
        let c = registry.register(FakePeer::new(3));

        let report = pass(&mut registry);

        assert_eq!(report.received, 1);
        assert_eq!(report.delivered, 2);
        assert!(registry.get(a).unwrap().sent().is_empty());
        assert_eq!(registry.get(b).unwrap().sent(), vec![b"alice:hello".to_vec()]);
        assert_eq!(registry.get(c).unwrap().sent(), vec![b"alice:hello".to_vec()]);
    }

    #[test]
    fn test_lone_sender_relays_nothing() {
        let mut registry = ClientRegistry::new();
        let a = registry.register(FakePeer::new(1).with_inbound(b"anyone?"));

        let report = pass(&mut registry);

        assert_eq!(report.received, 1);
        assert_eq!(report.delivered, 0);
        assert!(report.removed.is_empty());
        assert!(registry.get(a).is_some());
    }

    #[test]
    fn test_failed_target_does_not_stop_the_fan_out() {
        let mut registry = ClientRegistry::new();
        registry.register(FakePeer::new(1).with_inbound(b"ping"));
        let broken = registry.register(FakePeer::new(2).broken());
        let healthy = registry.register(FakePeer::new(3));

        let report = pass(&mut registry);

        assert_eq!(report.delivered, 1);
        assert_eq!(report.removed, vec![broken]);
        assert!(registry.get(broken).is_none());
        assert_eq!(registry.get(healthy).unwrap().sent(), vec![b"ping".to_vec()]);
    }

    #[test]
    fn test_clean_disconnect_removes_the_source() {
        let mut registry = ClientRegistry::new();
        let gone = registry.register(FakePeer::new(1).closed());
        let stays = registry.register(FakePeer::new(2));

        let report = pass(&mut registry);

        assert_eq!(report.removed, vec![gone]);
        assert_eq!(registry.ids(), vec![stays]);
    }

    #[test]
    fn test_disconnected_peer_is_not_a_target_in_the_same_pass() {
        let mut registry = ClientRegistry::new();
        let gone = registry.register(FakePeer::new(1).closed());
        let b = registry.register(FakePeer::new(2).with_inbound(b"late"));
        let c = registry.register(FakePeer::new(3));

        let report = pass(&mut registry);

        assert_eq!(report.delivered, 1);
        assert!(registry.get(gone).is_none());
        assert!(registry.get(b).unwrap().sent().is_empty());
        assert_eq!(registry.get(c).unwrap().sent(), vec![b"late".to_vec()]);
    }

    #[test]
    fn test_receive_error_drops_only_that_connection() {
        let mut registry = ClientRegistry::new();
        let reset = FakePeer::new(1);
        reset
            .inbound
            .borrow_mut()
            .push_back(Err(ErrorKind::ConnectionReset.into()));
        let reset = registry.register(reset);
        let other = registry.register(FakePeer::new(2));

        let report = pass(&mut registry);

        assert_eq!(report.removed, vec![reset]);
        assert!(registry.get(other).is_some());
    }

    #[test]
    fn test_each_connection_is_read_once_per_pass() {
        let mut registry = ClientRegistry::new();
        let a = registry.register(
            FakePeer::new(1)
                .with_inbound(b"first")
                .with_inbound(b"second"),
        );
        let b = registry.register(FakePeer::new(2));

        pass(&mut registry);
        assert_eq!(registry.get(b).unwrap().sent(), vec![b"first".to_vec()]);

        pass(&mut registry);
        assert_eq!(
            registry.get(b).unwrap().sent(),
            vec![b"first".to_vec(), b"second".to_vec()]
        );
        assert!(registry.get(a).unwrap().sent().is_empty());
    }

    #[test]
    fn test_partial_writes_are_completed() {
        let mut registry = ClientRegistry::new();
        registry.register(FakePeer::new(1).with_inbound(b"abcdef"));
        let mut slow = FakePeer::new(2);
        slow.send_limit = Some(4);
        let slow = registry.register(slow);

        let report = pass(&mut registry);

        assert_eq!(report.delivered, 1);
        assert_eq!(
            registry.get(slow).unwrap().sent(),
            vec![b"abcd".to_vec(), b"ef".to_vec()]
        );
    }

    #[test]
    fn test_full_send_buffer_drops_target_and_fan_out_continues() {
        let mut registry = ClientRegistry::new();
        let source = registry.register(FakePeer::new(1).with_inbound(b"abcdef"));
        let stalled = registry.register(FakePeer::new(2).backed_up(0));
        let partial = registry.register(FakePeer::new(3).backed_up(4));
        let healthy = registry.register(FakePeer::new(4));

        let report = pass(&mut registry);

        assert_eq!(report.delivered, 1);
        assert_eq!(report.removed, vec![stalled, partial]);
        assert_eq!(registry.ids(), vec![source, healthy]);
        assert_eq!(registry.get(healthy).unwrap().sent(), vec![b"abcdef".to_vec()]);
    }

    #[test]
    fn test_idle_pass_reports_idle() {
        let mut registry = ClientRegistry::new();
        registry.register(FakePeer::new(1));
        registry.register(FakePeer::new(2));

        assert!(pass(&mut registry).is_idle());
    }
}
