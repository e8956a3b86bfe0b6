use crate::model::{Indicator, MenuDisplayState, VpnAction};
use anyhow::{Context, Result};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

pub const QUICK_CONNECT_ID: &str = "quick_connect";
pub const RECONNECT_ID: &str = "reconnect";
pub const DISCONNECT_ID: &str = "disconnect";
pub const QUIT_ID: &str = "quit";

const ICON_SIZE: u32 = 32;
const GREEN: [u8; 3] = [0x2e, 0xcc, 0x71];
const RED: [u8; 3] = [0xe7, 0x4c, 0x3c];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Vpn(VpnAction),
    Quit,
}

pub fn menu_action(id: &MenuId) -> Option<MenuAction> {
    match id.as_ref() {
        QUICK_CONNECT_ID => Some(MenuAction::Vpn(VpnAction::QuickConnect)),
        RECONNECT_ID => Some(MenuAction::Vpn(VpnAction::Reconnect)),
        DISCONNECT_ID => Some(MenuAction::Vpn(VpnAction::Disconnect)),
        QUIT_ID => Some(MenuAction::Quit),
        _ => None,
    }
}

/// Tray icon plus the menu items whose text follows `MenuDisplayState`.
pub struct TrayManager {
    tray: TrayIcon,
    elapsed_time: MenuItem,
    location: MenuItem,
    reconnect: MenuItem,
    kill_switch: MenuItem,
    dns_leak_protection: MenuItem,
    shown: MenuDisplayState,
}

impl TrayManager {
    pub fn new() -> Result<Self> {
        let elapsed_time = MenuItem::new("", true, None);
        let location = MenuItem::new("", true, None);
        let quick_connect = MenuItem::with_id(QUICK_CONNECT_ID, "Quick Connect", true, None);
        let reconnect = MenuItem::with_id(RECONNECT_ID, "Reconnect", true, None);
        let disconnect = MenuItem::with_id(DISCONNECT_ID, "Disconnect", true, None);
        let kill_switch = MenuItem::new("", true, None);
        let dns_leak_protection = MenuItem::new("", true, None);
        let quit = MenuItem::with_id(QUIT_ID, "Exit", true, None);

        let menu = Menu::new();
        menu.append_items(&[
            &elapsed_time,
            &location,
            &PredefinedMenuItem::separator(),
            &quick_connect,
            &reconnect,
            &disconnect,
            &PredefinedMenuItem::separator(),
            &kill_switch,
            &dns_leak_protection,
            &PredefinedMenuItem::separator(),
            &quit,
        ])
        .context("building tray menu")?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("ProtonVPN")
            .with_icon(indicator_icon(Indicator::Error)?)
            .with_title("")
            .build()
            .context("creating tray icon")?;

        Ok(Self {
            tray,
            elapsed_time,
            location,
            reconnect,
            kill_switch,
            dns_leak_protection,
            shown: MenuDisplayState::default(),
        })
    }

    /// Pushes changed slots to the toolkit; the icon only on an edge.
    pub fn update(&mut self, display: &MenuDisplayState, change: Option<Indicator>) {
        if let Some(indicator) = change {
            match indicator_icon(indicator) {
                Ok(icon) => {
                    if let Err(e) = self.tray.set_icon(Some(icon)) {
                        tracing::warn!(error = %e, "failed to swap tray icon");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to render tray icon"),
            }
        }

        let shown = &self.shown;
        for (item, new, old) in [
            (&self.elapsed_time, &display.elapsed_time, &shown.elapsed_time),
            (&self.location, &display.location, &shown.location),
            (&self.reconnect, &display.reconnect_label, &shown.reconnect_label),
            (&self.kill_switch, &display.kill_switch, &shown.kill_switch),
            (
                &self.dns_leak_protection,
                &display.dns_leak_protection,
                &shown.dns_leak_protection,
            ),
        ] {
            if new != old {
                item.set_text(new);
            }
        }
        if display.tray_label != shown.tray_label {
            self.tray.set_title(Some(&display.tray_label));
        }

        self.shown = display.clone();
    }
}

fn indicator_icon(indicator: Indicator) -> Result<Icon> {
    let colour = match indicator {
        Indicator::Connected => GREEN,
        Indicator::Error => RED,
    };
    Icon::from_rgba(disc_rgba(ICON_SIZE, colour), ICON_SIZE, ICON_SIZE)
        .context("building indicator icon")
}

fn disc_rgba(size: u32, [r, g, b]: [u8; 3]) -> Vec<u8> {
    let centre = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.0 - 1.0;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - centre;
            let dy = y as f32 - centre;
            let alpha = if (dx * dx + dy * dy).sqrt() <= radius { 0xff } else { 0 };
            rgba.extend_from_slice(&[r, g, b, alpha]);
        }
    }
    rgba
}
