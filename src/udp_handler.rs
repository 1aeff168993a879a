//! UDP broadcast handler.
//!
//! Each record becomes one datagram of the form `LEVEL<delimiter>message\n`
//! sent to the broadcast address on [`DEFAULT_UDP_PORT`]. Datagrams are sent
//! inline; a UDP send does not wait on the peer so no worker thread is used.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
};

use log::warn;

use crate::{
    handler::{FemtoHandlerTrait, HandlerError},
    log_record::FemtoLogRecord,
    rate_limited_warner::RateLimitedWarner,
};

/// Port receivers listen on by default.
pub const DEFAULT_UDP_PORT: u16 = 5100;
/// Separator between the level and the message.
pub const DEFAULT_DELIMITER: char = '\t';

/// Settings for [`FemtoUdpHandler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UdpHandlerConfig {
    pub target: SocketAddr,
    pub delimiter: char,
}

impl Default for UdpHandlerConfig {
    fn default() -> Self {
        Self {
            target: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, DEFAULT_UDP_PORT)),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl UdpHandlerConfig {
    /// Broadcast on `port` instead of the default.
    pub fn with_port(mut self, port: u16) -> Self {
        self.target.set_port(port);
        self
    }

    /// Send to `target` instead of the broadcast address.
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[derive(Debug)]
pub struct FemtoUdpHandler {
    socket: UdpSocket,
    config: UdpHandlerConfig,
    warner: RateLimitedWarner,
}

impl FemtoUdpHandler {
    /// Broadcast with the default port and delimiter.
    pub fn new() -> io::Result<Self> {
        Self::with_config(UdpHandlerConfig::default())
    }

    pub fn with_config(config: UdpHandlerConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket,
            config,
            warner: RateLimitedWarner::default(),
        })
    }

    pub fn config(&self) -> &UdpHandlerConfig {
        &self.config
    }

    fn payload(&self, record: &FemtoLogRecord) -> String {
        format!(
            "{}{}{}\n",
            record.level(),
            self.config.delimiter,
            record.message()
        )
    }
}

impl FemtoHandlerTrait for FemtoUdpHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        let payload = self.payload(&record);
        match self.socket.send_to(payload.as_bytes(), self.config.target) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.warner.record_drop();
                self.warner.warn_if_due(|count| {
                    warn!(
                        "FemtoUdpHandler: send to {} failed ({err}), dropped {count} records",
                        self.config.target
                    );
                });
                Err(HandlerError::Io(err))
            }
        }
    }
}
