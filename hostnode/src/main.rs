// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CAN-FD example node on a host computer.
//!
//! The CAN-FD controller is an SLCAN serial adapter.
//! The user button is the Enter key and the user LED is printed.

mod button;
mod console;
mod irq;
mod led;
mod serial;
mod slcan;

use crate::{irq::ExtIntPin, led::Led, serial::SerialConfig};
use canfd_node::{
    MainCtx, Node, PendingTransmit, TxDescriptor,
    config::{NODE_ID, TX_BRS, TX_BUFFER_INDEX, TX_FD, TX_PAYLOAD},
    fault,
    rx::irq_handler_rx,
};
use clap::Parser;
use std::{thread, time::Duration};

#[derive(Parser, Debug)]
struct Opts {
    /// Serial port of the SLCAN adapter.
    #[arg(short, long, default_value = "/dev/ttyACM0")]
    port: String,

    /// Nominal bit rate.
    #[arg(short, long, default_value_t = 500_000)]
    bitrate: u32,

    /// Data phase bit rate.
    #[arg(short, long, default_value_t = 2_000_000)]
    data_bitrate: u32,

    /// Time to wait for the adapter to accept a frame.
    #[arg(long, default_value_t = 500)]
    tx_timeout_ms: u64,
}

static PENDING: PendingTransmit = PendingTransmit::new();
static BUTTON: ExtIntPin = ExtIntPin::new();

fn spawn(name: &str, f: impl FnOnce() + Send + 'static) {
    fault::check(thread::Builder::new().name(name.to_string()).spawn(f));
}

fn main() -> ! {
    let opts = Opts::parse();

    let (mut console, printer) = console::console();
    spawn("console", move || printer.run());

    let mut setup = None;
    // SAFETY: This is the main thread.
    // The interrupt threads are only started after this.
    let m = unsafe {
        MainCtx::new_with_init(|init| {
            let tx_element = fault::check(
                TxDescriptor {
                    id: NODE_ID,
                    kind: fault::check_option(NODE_ID.kind()),
                    payload: &TX_PAYLOAD,
                    fd: TX_FD,
                    brs: TX_BRS,
                }
                .build(),
            );
            let cfg = SerialConfig {
                port: &opts.port,
                bitrate: opts.bitrate,
                data_bitrate: opts.data_bitrate,
                tx_timeout: Duration::from_millis(opts.tx_timeout_ms),
            };
            let chan = fault::check(serial::open(init, &cfg));
            setup = Some((tx_element, chan));
        })
    };
    let (tx_element, (mut can_tx, mut can_rx)) = fault::check_option(setup);

    let node = Node::new(&tx_element, &PENDING, TX_BUFFER_INDEX);
    node.banner(&m, &mut console);
    eprintln!("Press Enter to send a frame.");

    // Enable interrupts.
    let led = Led::new(console.clone());
    let mut rx_console = console.clone();
    spawn("irq-can-rx", move || {
        loop {
            if let Err(e) = can_rx.run(|valid, raw| {
                irq::isr(|c| irq_handler_rx(c, valid, serial::RX_FIFO, raw, &led, &mut rx_console));
            }) {
                eprintln!("Serial error: {e:?}");
            }
            thread::sleep(Duration::from_millis(1000));
        }
    });
    spawn("irq-button", || {
        if let Err(e) = button::run(std::io::stdin().lock(), &BUTTON, &PENDING) {
            eprintln!("Button error: {e:?}");
        }
    });

    node.run_forever(&m, &mut can_tx, &mut console, || {
        thread::sleep(Duration::from_millis(1))
    })
}

// vim: ts=4 sw=4 expandtab
