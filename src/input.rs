//! Input device discovery & event stream (evdev 0.13.2 compatible)

use std::io;
use std::time::SystemTime;

use anyhow::{Result, anyhow};
use evdev::{
    AbsoluteAxisCode, Device, EventType, InputEvent, KeyCode, RelativeAxisCode,
    SynchronizationCode,
};
use log::{info, warn};

use crate::event::PointerEvent;
use crate::tracker::{MouseTracker, TouchTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Touch,
    Mouse,
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub kind: DeviceKind,
}

fn classify(dev: &Device) -> Option<DeviceKind> {
    let events = dev.supported_events();
    if events.contains(EventType::ABSOLUTE) {
        let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
            a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
                && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
                && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
        });
        if has_mt {
            return Some(DeviceKind::Touch);
        }
    }
    if events.contains(EventType::RELATIVE) {
        let has_motion = dev.supported_relative_axes().is_some_and(|a| {
            a.contains(RelativeAxisCode::REL_X) && a.contains(RelativeAxisCode::REL_Y)
        });
        let has_button = dev
            .supported_keys()
            .is_some_and(|k| k.contains(KeyCode::BTN_LEFT));
        if has_motion && has_button {
            return Some(DeviceKind::Mouse);
        }
    }
    None
}

/// Multitouch panels and mice under /dev/input.
pub fn discover_pointers() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = std::fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            if p.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with("event"))
            {
                if let Ok(dev) = Device::open(&p) {
                    if let Some(kind) = classify(&dev) {
                        out.push(DeviceInfo {
                            path: p.display().to_string(),
                            name: dev.name().unwrap_or("unknown").to_string(),
                            kind,
                        });
                    }
                }
            }
        }
    }
    out
}

enum Decoder {
    Touch(TouchTracker),
    Mouse(MouseTracker),
}

impl Decoder {
    fn feed(&mut self, ev: &InputEvent, now: f64, out: &mut Vec<PointerEvent>) {
        let is_report = ev.event_type() == EventType::SYNCHRONIZATION
            && ev.code() == SynchronizationCode::SYN_REPORT.0;
        match self {
            Decoder::Touch(t) => {
                if ev.event_type() == EventType::ABSOLUTE {
                    match ev.code() {
                        c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => t.on_slot(ev.value()),
                        c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                            t.on_tracking_id(ev.value())
                        }
                        c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => t.on_pos_x(ev.value()),
                        c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => t.on_pos_y(ev.value()),
                        _ => {}
                    }
                } else if is_report {
                    out.extend(t.frame(now));
                }
            }
            Decoder::Mouse(m) => {
                if ev.event_type() == EventType::RELATIVE {
                    match ev.code() {
                        c if c == RelativeAxisCode::REL_X.0 => m.on_rel_x(ev.value()),
                        c if c == RelativeAxisCode::REL_Y.0 => m.on_rel_y(ev.value()),
                        _ => {}
                    }
                } else if ev.event_type() == EventType::KEY && ev.code() == KeyCode::BTN_LEFT.0 {
                    // value 2 is autorepeat
                    match ev.value() {
                        0 => m.on_left_button(false),
                        1 => m.on_left_button(true),
                        _ => {}
                    }
                } else if is_report {
                    out.extend(m.frame(now));
                }
            }
        }
    }
}

/// Non-blocking reader over a set of pointer devices.
pub struct DeviceSource {
    devices: Vec<(String, Device, Decoder)>,
    // kernel input timestamps are CLOCK_REALTIME
    start: SystemTime,
}

impl DeviceSource {
    /// Opens the given devices, or every discovered pointer when empty.
    pub fn open(paths: &[String]) -> Result<Self> {
        let infos: Vec<DeviceInfo> = if paths.is_empty() {
            discover_pointers()
        } else {
            let all = discover_pointers();
            paths
                .iter()
                .map(|p| {
                    all.iter()
                        .find(|d| &d.path == p)
                        .cloned()
                        .ok_or_else(|| anyhow!("{p} is not a supported pointer device"))
                })
                .collect::<Result<_>>()?
        };

        let mut devices = Vec::new();
        for d in infos {
            match Device::open(&d.path) {
                Ok(mut dev) => {
                    if let Err(e) = dev.set_nonblocking(true) {
                        warn!("failed to set {} non-blocking: {e}", d.path);
                        continue;
                    }
                    info!("watching {} ({:?}) at {}", d.name, d.kind, d.path);
                    let decoder = match d.kind {
                        DeviceKind::Touch => Decoder::Touch(TouchTracker::new()),
                        DeviceKind::Mouse => Decoder::Mouse(MouseTracker::new()),
                    };
                    devices.push((d.path, dev, decoder));
                }
                Err(e) => warn!("failed to open {}: {e}", d.path),
            }
        }
        if devices.is_empty() {
            return Err(anyhow!("no pointer devices could be opened"));
        }
        Ok(Self {
            devices,
            start: SystemTime::now(),
        })
    }

    /// Milliseconds since the source was opened, for advancing hold timers
    /// between events.
    pub fn now_ms(&self) -> f64 {
        millis_since(self.start, SystemTime::now())
    }

    /// Drains whatever the devices have queued. Each frame is stamped with
    /// the kernel time of its `SYN_REPORT`. A device that fails with
    /// anything but `WouldBlock` is dropped.
    pub fn poll(&mut self) -> Vec<PointerEvent> {
        let start = self.start;
        let mut out = Vec::new();
        self.devices.retain_mut(|(path, dev, decoder)| match dev.fetch_events() {
            Ok(events) => {
                for ev in events {
                    decoder.feed(&ev, millis_since(start, ev.timestamp()), &mut out);
                }
                true
            }
            Err(e) if is_transient(&e) => true,
            Err(e) => {
                warn!("dropping {path}: {e}");
                false
            }
        });
        out
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

fn millis_since(start: SystemTime, at: SystemTime) -> f64 {
    at.duration_since(start)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
