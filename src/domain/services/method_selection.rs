use crate::domain::entities::InstallMethod;

const FLATPAK_ID_PREFIXES: [&str; 6] = ["com.", "org.", "io.", "net.", "app.", "dev."];

/// Catalog names whose installed binary is called something else.
const BINARY_ALIASES: [(&str, &str); 8] = [
    ("neovim", "nvim"),
    ("bottom", "btm"),
    ("ripgrep", "rg"),
    ("fd-find", "fd"),
    ("git-delta", "delta"),
    ("du-dust", "dust"),
    ("tealdeer", "tldr"),
    ("python", "python3"),
];

/// Guesses an installation method from the shape of a source string.
pub fn best_method(source: &str) -> InstallMethod {
    let lower = source.to_ascii_lowercase();
    if lower.contains("github.com") {
        InstallMethod::GitHub
    } else if lower.ends_with(".deb") {
        InstallMethod::Deb
    } else if lower.contains("flatpak") || lower.contains("flathub") {
        InstallMethod::Flatpak
    } else if lower.contains("snap") {
        InstallMethod::Snap
    } else {
        InstallMethod::Apt
    }
}

/// `owner/repo[/...]` -> `repo`; anything without a slash is returned as is.
pub fn extract_repo_name(reference: &str) -> &str {
    let mut parts = reference.split('/');
    let first = parts.next().unwrap_or_default();
    parts.next().unwrap_or(first)
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("https://") || source.starts_with("http://")
}

/// Reverse-domain application ids such as `org.mozilla.firefox`.
pub fn is_flatpak_app_id(name: &str) -> bool {
    name.contains('.') && FLATPAK_ID_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

pub fn binary_alias(name: &str) -> Option<&'static str> {
    BINARY_ALIASES
        .iter()
        .find(|(package, _)| *package == name)
        .map(|(_, binary)| *binary)
}

/// Splits `owner/repo` references; URLs and bare names yield `None`.
pub fn parse_repository(reference: &str) -> Option<(&str, &str)> {
    if is_url(reference) {
        return None;
    }
    let mut parts = reference.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => Some((owner, repo)),
        _ => None,
    }
}
