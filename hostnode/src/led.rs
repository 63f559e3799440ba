// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::console::Console;
use canfd_node::hw::StatusLed;
use std::{
    cell::{Cell, RefCell},
    fmt::Write as _,
};

/// Emulated user LED. State changes show up on the console.
pub struct Led {
    on: Cell<bool>,
    console: RefCell<Console>,
}

impl Led {
    pub fn new(console: Console) -> Self {
        Self {
            on: Cell::new(false),
            console: RefCell::new(console),
        }
    }
}

impl StatusLed for Led {
    fn toggle(&self) {
        let on = !self.on.get();
        self.on.set(on);
        let _ = writeln!(
            self.console.borrow_mut(),
            "LED {}",
            if on { "on" } else { "off" }
        );
    }
}


// vim: ts=4 sw=4 expandtab
