// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CAN-FD channel on an SLCAN serial adapter.

use crate::slcan::{self, Decoder, Event};
use anyhow::{self as ah, Context as _, format_err};
use canfd_node::{InitCtx, RxElement, TxElement, hw::CanFdTx};
use serialport::SerialPort;
use std::{
    io::{self, Read, Write},
    sync::mpsc,
    time::{Duration, Instant},
};

const BAUD: u32 = 115_200;
const CMD_TIMEOUT: Duration = Duration::from_millis(500);
const ACK_QUEUE: usize = 4;

/// SLCAN has one receive queue.
pub const RX_FIFO: u8 = 0;

pub struct SerialConfig<'a> {
    pub port: &'a str,
    pub bitrate: u32,
    pub data_bitrate: u32,
    pub tx_timeout: Duration,
}

#[derive(Debug)]
pub enum TxError {
    NoSuchBuffer(u8),
    Io(io::Error),
    Refused,
    Timeout,
    ReaderGone,
}

impl std::fmt::Display for TxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchBuffer(index) => write!(f, "No TX buffer {index}"),
            Self::Io(e) => write!(f, "Serial port write: {e}"),
            Self::Refused => write!(f, "Refused by adapter"),
            Self::Timeout => write!(f, "No reply from adapter"),
            Self::ReaderGone => write!(f, "Receiver stopped"),
        }
    }
}

/// Transmit half of the channel.
pub struct SlcanTx<W> {
    port: W,
    acks: mpsc::Receiver<bool>,
    timeout: Duration,
}

/// Receive half of the channel.
pub struct SlcanRx<R> {
    port: R,
    decoder: Decoder,
    acks: mpsc::SyncSender<bool>,
}

/// Create a connected pair of channel halves.
fn split<W, R>(tx_port: W, rx_port: R, decoder: Decoder, timeout: Duration) -> (SlcanTx<W>, SlcanRx<R>) {
    let (ack_tx, ack_rx) = mpsc::sync_channel(ACK_QUEUE);
    (
        SlcanTx {
            port: tx_port,
            acks: ack_rx,
            timeout,
        },
        SlcanRx {
            port: rx_port,
            decoder,
            acks: ack_tx,
        },
    )
}

/// Wait for the adapter to accept or refuse a command.
fn wait_ack(port: &mut (impl Read + ?Sized), decoder: &mut Decoder) -> ah::Result<()> {
    let deadline = Instant::now() + CMD_TIMEOUT;
    let mut buf = [0_u8; 64];
    while Instant::now() < deadline {
        let count = match port.read(&mut buf) {
            Ok(0) => ah::bail!("Serial port closed"),
            Ok(count) => count,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) => return Err(e).context("Serial port read"),
        };
        for &byte in &buf[..count] {
            match decoder.push(byte) {
                Some(Event::Ack) => return Ok(()),
                Some(Event::Nack) => ah::bail!("Command refused by adapter"),
                _ => (),
            }
        }
    }
    Err(format_err!("No reply from adapter"))
}

fn command(
    port: &mut (impl Read + Write + ?Sized),
    decoder: &mut Decoder,
    cmd: &[u8],
) -> ah::Result<()> {
    port.write_all(cmd).context("Serial port write")?;
    wait_ack(port, decoder).with_context(|| {
        format!("Adapter command {:?}", String::from_utf8_lossy(&cmd[..cmd.len() - 1]))
    })
}

/// Open the adapter and bring the CAN-FD channel on the bus.
pub fn open(
    _init: &InitCtx,
    cfg: &SerialConfig<'_>,
) -> ah::Result<(SlcanTx<Box<dyn SerialPort>>, SlcanRx<Box<dyn SerialPort>>)> {
    let nominal = slcan::bitrate_cmd(cfg.bitrate)
        .ok_or_else(|| format_err!("Unsupported bit rate: {}", cfg.bitrate))?;
    let data = slcan::data_bitrate_cmd(cfg.data_bitrate)
        .ok_or_else(|| format_err!("Unsupported data bit rate: {}", cfg.data_bitrate))?;

    let mut port = serialport::new(cfg.port, BAUD)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .flow_control(serialport::FlowControl::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(CMD_TIMEOUT)
        .open()
        .context("Open serial port")?;
    let mut decoder = Decoder::new();

    // The channel may still be open from a previous run.
    // Closing a closed channel is refused. That's fine.
    port.write_all(slcan::CLOSE_CMD).context("Serial port write")?;
    let _ = wait_ack(&mut *port, &mut decoder);

    for cmd in [nominal, data, slcan::OPEN_CMD] {
        command(&mut *port, &mut decoder, cmd)?;
    }

    let reader = port.try_clone().context("Clone serial port")?;
    Ok(split(port, reader, decoder, cfg.tx_timeout))
}

impl<W: Write> SlcanTx<W> {
    fn drain(&self) {
        while self.acks.try_recv().is_ok() {}
    }

    fn send(&mut self, element: &TxElement, buffer_index: u8) -> Result<(), TxError> {
        if buffer_index != 0 {
            return Err(TxError::NoSuchBuffer(buffer_index));
        }

        // Drop stale replies.
        // SLCAN replies carry no reference to the frame they belong to.
        // A reply to a timed out frame that arrives after this point is
        // credited to this frame.
        self.drain();

        self.port
            .write_all(&slcan::encode_frame(element))
            .and_then(|()| self.port.flush())
            .map_err(TxError::Io)?;

        match self.acks.recv_timeout(self.timeout) {
            Ok(true) => Ok(()),
            Ok(false) => Err(TxError::Refused),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.drain();
                Err(TxError::Timeout)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(TxError::ReaderGone),
        }
    }
}

impl<W: Write> CanFdTx for SlcanTx<W> {
    type Error = TxError;

    fn transmit(&mut self, element: &TxElement, buffer_index: u8) -> Result<(), TxError> {
        self.send(element, buffer_index)
            .inspect_err(|e| eprintln!("CAN transmit: {e}"))
    }
}

impl<R: Read> SlcanRx<R> {
    /// Read from the adapter until an error occurs.
    ///
    /// `on_frame` is called with the validity flag and the receive element.
    /// Replies are routed to the transmit half.
    pub fn run(&mut self, mut on_frame: impl FnMut(bool, &RxElement)) -> ah::Result<()> {
        let mut buf = [0_u8; 256];
        loop {
            let count = match self.port.read(&mut buf) {
                Ok(0) => ah::bail!("Serial port closed"),
                Ok(count) => count,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e).context("Serial port read"),
            };
            for &byte in &buf[..count] {
                if let Some(event) = self.decoder.push(byte) {
                    self.dispatch(event, &mut on_frame);
                }
            }
        }
    }

    fn dispatch(&self, event: Event, on_frame: &mut impl FnMut(bool, &RxElement)) {
        match event {
            Event::Ack | Event::TxAck => self.reply(true),
            Event::Nack => self.reply(false),
            Event::Frame(Ok(element)) => on_frame(true, &element),
            Event::Frame(Err(_)) => on_frame(false, &RxElement::zeroed()),
            Event::Other => (),
        }
    }

    fn reply(&self, ok: bool) {
        // Nobody waits for it, if the queue is full.
        let _ = self.acks.try_send(ok);
    }
}


// vim: ts=4 sw=4 expandtab
