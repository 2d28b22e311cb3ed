//! `whoami` handler.

use std::fmt::Write as _;

use tabled::Tabled;

use mistly_api::{Account, MistClient, Privilege};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PrivilegeRow {
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Privilege> for PrivilegeRow {
    fn from(p: &Privilege) -> Self {
        let id = match p.scope.as_str() {
            "site" => &p.site_id,
            "msp" => &p.msp_id,
            _ => &p.org_id,
        };
        Self {
            scope: p.scope.clone(),
            name: p.name.clone(),
            role: p.role.clone(),
            id: id.clone(),
        }
    }
}

fn detail(account: &Account) -> String {
    let mut out = String::new();
    let name = format!("{} {}", account.first_name, account.last_name);
    let _ = writeln!(out, "Email:    {}", account.email);
    let _ = writeln!(out, "Name:     {}", name.trim());
    if !account.phone.is_empty() {
        let _ = writeln!(out, "Phone:    {}", account.phone);
    }
    let _ = writeln!(out, "SSO:      {}", if account.sso { "yes" } else { "no" });
    if let Some(ts) = account.password_modified_time {
        let _ = writeln!(out, "Password: changed {}", ts.format("%Y-%m-%d"));
    }
    if !account.privileges.is_empty() {
        let rows: Vec<PrivilegeRow> = account.privileges.iter().map(PrivilegeRow::from).collect();
        let _ = write!(out, "\n{}", output::render_table(&rows));
    }
    out
}

pub async fn whoami(client: &MistClient, global: &GlobalOpts) -> Result<(), CliError> {
    let account = client.get_self().await?;
    let out = output::render_single(global.output, &account, detail)?;
    output::print_output(&out)
}
