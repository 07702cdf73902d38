//! Human-readable output.
//!
//! Lists render as aligned columns with a highlighted header row; single
//! results render as `label: value` lines.

use colored::Colorize;

use crate::core::models::{
    ActionResult, AssetSummary, AssetUploadResult, BuildSummary, CertificateSummary,
    CreateBuildWithManagedContainerResponse, CredentialOrigin, EnableResult, GetBuildResponse,
    ImageTags, MultiplayerServerSummary, QosServer, RequestMultiplayerServerResponse,
    TitleStatus,
};
use crate::util::format::{format_bytes, format_metadata, format_optional_time};
use crate::util::time::format_countdown;

/// Values that know how to print themselves for a terminal.
pub trait HumanRender {
    fn render_human(&self, color: bool) -> String;
}

/// Column-aligned table.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let pad = |text: &str, width: usize| {
            let fill = width.saturating_sub(text.chars().count());
            format!("{text}{}", " ".repeat(fill))
        };

        let mut out = String::new();
        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect();
        let header = header.join("  ");
        let header = header.trim_end();
        if color {
            out.push_str(&header.bold().cyan().to_string());
        } else {
            out.push_str(header);
        }
        out.push('\n');

        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| pad(cell, *w))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

fn empty(what: &str, color: bool) -> String {
    let text = format!("No {what} found.");
    if color {
        format!("{}\n", text.dimmed())
    } else {
        format!("{text}\n")
    }
}

fn label(name: &str, color: bool) -> String {
    let text = format!("{name}:");
    if color {
        text.bold().to_string()
    } else {
        text
    }
}

fn field(out: &mut String, name: &str, value: &str, color: bool) {
    out.push_str(&format!("{:<14}{value}\n", label(name, color)));
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

// =============================================================================
// Title
// =============================================================================

impl HumanRender for TitleStatus {
    fn render_human(&self, color: bool) -> String {
        let mut out = String::new();
        field(&mut out, "Title", &self.title_id, color);
        let origin = match self.origin {
            CredentialOrigin::Environment => "environment".to_string(),
            CredentialOrigin::Store => self.store.clone(),
        };
        field(&mut out, "Credentials", &origin, color);
        field(&mut out, "API", &self.base_url, color);
        match &self.token {
            None => field(&mut out, "Token", "none cached", color),
            Some(token) => {
                let state = if token.refreshed {
                    "retrieved"
                } else if token.fresh {
                    "cached"
                } else {
                    "stale"
                };
                let state = if color {
                    if token.fresh {
                        state.green().to_string()
                    } else {
                        state.yellow().to_string()
                    }
                } else {
                    state.to_string()
                };
                field(&mut out, "Token", &state, color);
                field(
                    &mut out,
                    "Refresh",
                    &format!(
                        "{} ({})",
                        format_optional_time(Some(token.refresh_at)),
                        format_countdown(token.refresh_at)
                    ),
                    color,
                );
                if token.server_expiration.is_some() {
                    field(
                        &mut out,
                        "Expires",
                        &format_optional_time(token.server_expiration),
                        color,
                    );
                }
            }
        }
        out
    }
}

impl HumanRender for ActionResult {
    fn render_human(&self, color: bool) -> String {
        let target = if color {
            self.target.bold().to_string()
        } else {
            self.target.clone()
        };
        format!("{} {target}\n", self.action)
    }
}

// =============================================================================
// Builds
// =============================================================================

impl HumanRender for Vec<BuildSummary> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("builds", color);
        }
        let mut table = Table::new(&["BUILD ID", "NAME", "CREATED", "METADATA"]);
        for build in self {
            table.row(vec![
                build.build_id.clone(),
                build.build_name.clone(),
                format_optional_time(build.creation_time),
                format_metadata(&build.metadata),
            ]);
        }
        table.render(color)
    }
}

impl HumanRender for Vec<GetBuildResponse> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("builds", color);
        }
        let mut out = String::new();
        for (i, build) in self.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            field(&mut out, "Build", &build.build_id, color);
            field(&mut out, "Name", &build.build_name, color);
            field(&mut out, "Status", &or_dash(build.build_status.as_deref()), color);
            field(&mut out, "Created", &format_optional_time(build.creation_time), color);
            field(&mut out, "VM size", &or_dash(build.vm_size.as_deref()), color);
            if let Some(count) = build.multiplayer_server_count_per_vm {
                field(&mut out, "Servers/VM", &count.to_string(), color);
            }
            let ports = build
                .ports
                .iter()
                .map(|p| format!("{}:{}/{}", p.name, p.num, p.protocol))
                .collect::<Vec<_>>()
                .join(", ");
            field(&mut out, "Ports", if ports.is_empty() { "-" } else { &ports }, color);
            field(&mut out, "Metadata", &format_metadata(&build.metadata), color);
            if !build.region_configurations.is_empty() {
                let mut table = Table::new(&["REGION", "STANDBY", "MAX", "STATUS"]);
                for rc in &build.region_configurations {
                    table.row(vec![
                        rc.region.clone(),
                        rc.standby_servers.to_string(),
                        rc.max_servers.to_string(),
                        or_dash(rc.status.as_deref()),
                    ]);
                }
                out.push_str(&table.render(color));
            }
        }
        out
    }
}

impl HumanRender for CreateBuildWithManagedContainerResponse {
    fn render_human(&self, color: bool) -> String {
        let mut out = String::new();
        field(&mut out, "Build", &or_dash(self.build_id.as_deref()), color);
        field(&mut out, "Name", &or_dash(self.build_name.as_deref()), color);
        field(&mut out, "Created", &format_optional_time(self.creation_time), color);
        out
    }
}

// =============================================================================
// Assets, certificates, images
// =============================================================================

impl HumanRender for Vec<AssetSummary> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("assets", color);
        }
        let mut table = Table::new(&["FILE NAME", "METADATA"]);
        for asset in self {
            table.row(vec![asset.file_name.clone(), format_metadata(&asset.metadata)]);
        }
        table.render(color)
    }
}

impl HumanRender for AssetUploadResult {
    fn render_human(&self, color: bool) -> String {
        let mut out = String::new();
        field(&mut out, "Uploaded", &self.asset_name, color);
        let size = if self.blocks == 0 {
            format_bytes(self.bytes)
        } else {
            format!("{} in {} blocks", format_bytes(self.bytes), self.blocks)
        };
        field(&mut out, "Size", &size, color);
        if !self.metadata.is_empty() {
            field(&mut out, "Metadata", &format_metadata(&self.metadata), color);
        }
        out
    }
}

impl HumanRender for Vec<CertificateSummary> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("certificates", color);
        }
        let mut table = Table::new(&["NAME", "THUMBPRINT"]);
        for cert in self {
            table.row(vec![cert.name.clone(), or_dash(cert.thumbprint.as_deref())]);
        }
        table.render(color)
    }
}

impl HumanRender for Vec<String> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("images", color);
        }
        let mut table = Table::new(&["IMAGE"]);
        for image in self {
            table.row(vec![image.clone()]);
        }
        table.render(color)
    }
}

impl HumanRender for ImageTags {
    fn render_human(&self, color: bool) -> String {
        if self.tags.is_empty() {
            return empty(&format!("tags for {}", self.image_name), color);
        }
        let mut table = Table::new(&["TAG"]);
        for tag in &self.tags {
            table.row(vec![tag.clone()]);
        }
        table.render(color)
    }
}

// =============================================================================
// Servers and QoS
// =============================================================================

impl HumanRender for RequestMultiplayerServerResponse {
    fn render_human(&self, color: bool) -> String {
        let mut out = String::new();
        field(&mut out, "Server", &or_dash(self.server_id.as_deref()), color);
        field(&mut out, "Session", &or_dash(self.session_id.as_deref()), color);
        field(&mut out, "State", &or_dash(self.state.as_deref()), color);
        field(&mut out, "Region", &or_dash(self.region.as_deref()), color);
        field(&mut out, "FQDN", &or_dash(self.fqdn.as_deref()), color);
        field(&mut out, "IPv4", &or_dash(self.ipv4_address.as_deref()), color);
        let ports = self
            .ports
            .iter()
            .map(|p| format!("{}={}/{}", p.name, p.num, p.protocol))
            .collect::<Vec<_>>()
            .join(", ");
        field(&mut out, "Ports", if ports.is_empty() { "-" } else { &ports }, color);
        out
    }
}

impl HumanRender for Vec<MultiplayerServerSummary> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("servers", color);
        }
        let mut table = Table::new(&["SERVER ID", "SESSION ID", "STATE", "REGION", "VM ID"]);
        for server in self {
            table.row(vec![
                or_dash(server.server_id.as_deref()),
                or_dash(server.session_id.as_deref()),
                or_dash(server.state.as_deref()),
                or_dash(server.region.as_deref()),
                or_dash(server.vm_id.as_deref()),
            ]);
        }
        table.render(color)
    }
}

impl HumanRender for EnableResult {
    fn render_human(&self, color: bool) -> String {
        let status = if color {
            self.status.to_string().green().to_string()
        } else {
            self.status.to_string()
        };
        format!(
            "Multiplayer servers {status} for title after {}s.\n",
            self.elapsed_seconds
        )
    }
}

impl HumanRender for Vec<QosServer> {
    fn render_human(&self, color: bool) -> String {
        if self.is_empty() {
            return empty("QoS servers", color);
        }
        let mut table = Table::new(&["REGION", "SERVER URL"]);
        for server in self {
            table.row(vec![
                or_dash(server.region.as_deref()),
                or_dash(server.server_url.as_deref()),
            ]);
        }
        table.render(color)
    }
}
