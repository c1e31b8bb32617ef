//! Entry point for the droidmon TUI. Parses args, resolves the server profile and runs the App.

mod app;
mod ui;

use app::{App, AppOptions};
use droidmon::api::DEFAULT_SERVER;
use droidmon::controller::{validate_interval, MAX_INTERVAL_SECS};
use droidmon::logging::{init_file_logging, log_path};
use droidmon::profiles::{
    load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile,
};
use droidmon::types::ConnectOptions;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

const DEFAULT_INTERVAL: f64 = 1.0;
const DEMO_PORT: u16 = 5231;

#[derive(Debug, Default)]
struct ParsedArgs {
    url: Option<String>,
    profile: Option<String>,
    interval: Option<f64>,
    wireless_ip: Option<String>,
    export_dir: Option<PathBuf>,
    save: bool,
    demo: bool,
    dry_run: bool,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--profile NAME|-P NAME] [--save] [--interval SECS|-i SECS] [--wireless IP|-w IP] [--export-dir DIR|-o DIR] [--demo] [--dry-run] [http://HOST:PORT]"
    )
}

fn parse_interval(v: &str) -> Result<f64, String> {
    match v.parse::<f64>() {
        Ok(x) if validate_interval(x).is_ok() => Ok(x),
        _ => Err(format!(
            "invalid interval {v:?}: expected seconds in (0, {MAX_INTERVAL_SECS}]"
        )),
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "droidmon".into());
    let mut out = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--profile" | "-P" => out.profile = it.next(),
            "--interval" | "-i" => {
                let v = it.next().ok_or_else(|| usage(&prog))?;
                out.interval = Some(parse_interval(&v)?);
            }
            "--wireless" | "-w" => out.wireless_ip = it.next(),
            "--export-dir" | "-o" => out.export_dir = it.next().map(PathBuf::from),
            "--save" => out.save = true,
            "--demo" => out.demo = true,
            "--dry-run" => out.dry_run = true,
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        out.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--interval=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    out.interval = Some(parse_interval(v)?);
                }
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option {arg}. {}", usage(&prog)));
            }
            _ => {
                if out.url.is_none() {
                    out.url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }
    Ok(out)
}

fn connect_options(ip: Option<String>) -> ConnectOptions {
    match ip {
        Some(ip) => ConnectOptions::wireless(ip),
        None => ConnectOptions::wired(),
    }
}

fn default_export_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    if let Err(e) = init_file_logging(&log_path()) {
        eprintln!("logging disabled: {e}");
    }

    let export_dir = parsed.export_dir.clone().unwrap_or_else(default_export_dir);

    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        return run_demo_mode(parsed.interval, export_dir).await;
    }

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        interval: parsed.interval,
        wireless_ip: parsed.wireless_ip.clone(),
    };

    let mut profiles_mut = profiles_file.clone();
    let entry: ProfileEntry = match req.resolve(&profiles_file) {
        ResolveProfile::Direct(entry) => {
            if let Some(name) = parsed.profile.as_ref() {
                match profiles_mut.profiles.get(name) {
                    None => {
                        // New profile: auto-save immediately
                        profiles_mut.profiles.insert(name.clone(), entry.clone());
                        persist(&profiles_mut);
                    }
                    Some(existing) if *existing != entry => {
                        let overwrite = parsed.save
                            || prompt_yes_no(&format!(
                                "Overwrite existing profile '{name}'? [y/N]: "
                            ));
                        if overwrite {
                            profiles_mut.profiles.insert(name.clone(), entry.clone());
                            persist(&profiles_mut);
                        }
                    }
                    Some(_) => {}
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(mut names) => {
            if !names.iter().any(|n| n == "demo") {
                names.push("demo".into());
            }
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let Some(name) = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
            else {
                return Ok(());
            };
            if name == "demo" {
                return run_demo_mode(parsed.interval, export_dir).await;
            }
            match profiles_mut.profiles.get(name) {
                Some(entry) => entry.clone(),
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string(&format!("Enter server URL (default {DEFAULT_SERVER}): "))?;
            let url = match url.trim() {
                "" => DEFAULT_SERVER.to_string(),
                u => u.to_string(),
            };
            let ip = prompt_string("Device IP for wireless adb (or leave blank for USB): ")?;
            let entry = ProfileEntry {
                url,
                interval: parsed.interval,
                wireless_ip: Some(ip.trim().to_string()).filter(|s| !s.is_empty()),
            };
            profiles_mut.profiles.insert(name, entry.clone());
            persist(&profiles_mut);
            entry
        }
        ResolveProfile::None => ProfileEntry {
            url: DEFAULT_SERVER.to_string(),
            interval: parsed.interval,
            wireless_ip: parsed.wireless_ip.clone(),
        },
    };

    let options = AppOptions {
        server: entry.url,
        interval: entry.interval.unwrap_or(DEFAULT_INTERVAL),
        connect: connect_options(entry.wireless_ip),
        export_dir,
    };
    if parsed.dry_run {
        // Resolve (and persist) the profile, then stop before touching the network
        println!("{options:?}");
        return Ok(());
    }
    let mut app = App::new(options)?;
    app.run().await
}

fn persist(p: &droidmon::profiles::ProfilesFile) {
    if let Err(e) = save_profiles(p) {
        tracing::warn!(error = %e, "could not save profiles");
        eprintln!("warning: could not save profiles: {e}");
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

async fn run_demo_mode(interval: Option<f64>, export_dir: PathBuf) -> anyhow::Result<()> {
    let child = spawn_demo_agent(DEMO_PORT)?;
    let mut app = App::new(AppOptions {
        server: format!("http://127.0.0.1:{DEMO_PORT}"),
        interval: interval.unwrap_or(DEFAULT_INTERVAL),
        connect: ConnectOptions::wired(),
        export_dir,
    })?;
    tokio::select! {
        res = app.run() => { drop(child); res }
        _ = tokio::signal::ctrl_c() => {
            // Drop child (kills agent) then return
            drop(child);
            Ok(())
        }
    }
}

struct DemoGuard(std::process::Child);

impl Drop for DemoGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_demo_agent(port: u16) -> io::Result<DemoGuard> {
    let mut cmd = std::process::Command::new(find_agent_executable());
    cmd.arg("--port").arg(port.to_string());
    cmd.stdout(std::process::Stdio::null());
    cmd.stderr(std::process::Stdio::null());
    let child = cmd.spawn()?;
    // Give the agent a brief moment to bind
    std::thread::sleep(std::time::Duration::from_millis(300));
    tracing::info!(port, "demo agent started");
    Ok(DemoGuard(child))
}

fn find_agent_executable() -> PathBuf {
    #[cfg(windows)]
    let name = "droidmon_agent.exe";
    #[cfg(not(windows))]
    let name = "droidmon_agent";
    if let Some(dir) = env::current_exe().ok().and_then(|e| e.parent().map(PathBuf::from)) {
        let candidate = dir.join(name);
        if candidate.exists() {
            return candidate;
        }
    }
    // Fallback to relying on PATH
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("droidmon")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_short_and_long_flags() {
        let p = parse_args(args(&["-P", "lab", "-i", "0.5", "-w", "10.0.0.2", "http://h:5000"]))
            .unwrap();
        assert_eq!(p.profile.as_deref(), Some("lab"));
        assert_eq!(p.interval, Some(0.5));
        assert_eq!(p.wireless_ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(p.url.as_deref(), Some("http://h:5000"));

        let p = parse_args(args(&["--profile=lab", "--interval=2", "--save", "-o", "/tmp/x"]))
            .unwrap();
        assert_eq!(p.profile.as_deref(), Some("lab"));
        assert_eq!(p.interval, Some(2.0));
        assert!(p.save);
        assert_eq!(p.export_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn rejects_bad_interval_and_extra_positional() {
        assert!(parse_args(args(&["-i", "0"])).is_err());
        assert!(parse_args(args(&["-i", "1e20"])).is_err());
        assert!(parse_args(args(&["--interval=abc"])).is_err());
        assert!(parse_args(args(&["http://a", "http://b"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn wireless_ip_selects_wireless_connect() {
        assert_eq!(connect_options(None), ConnectOptions::wired());
        assert!(connect_options(Some("10.0.0.2".into())).wireless);
    }
}
