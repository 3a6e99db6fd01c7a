/// Alert sound played at interval expiry
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub trait Alert {
    /// Starts playback and returns immediately.
    fn play(&mut self);
    fn stop(&mut self);
}

const MACOS_SOUNDS: [&str; 3] = [
    "/System/Library/Sounds/Glass.aiff",
    "/System/Library/Sounds/Ping.aiff",
    "/System/Library/Sounds/Pop.aiff",
];

const LINUX_SOUNDS: [&str; 3] = [
    "/usr/share/sounds/sound-icons/bell.wav",
    "/usr/share/sounds/alsa/Front_Left.wav",
    "/usr/share/sounds/gnome/default/alerts/glass.ogg",
];

fn players() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["afplay"]
    } else if cfg!(target_os = "linux") {
        &["paplay", "aplay"]
    } else {
        &[]
    }
}

fn system_sounds() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &MACOS_SOUNDS
    } else if cfg!(target_os = "linux") {
        &LINUX_SOUNDS
    } else {
        &[]
    }
}

/// Sound file used when nothing is configured: `sounds/bell.wav` beside the
/// executable.
pub fn default_sound_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("sounds").join("bell.wav"))
}

/// Plays a sound file through the platform player, falling back to the
/// terminal bell.
#[derive(Debug)]
pub struct SystemBell {
    source: Option<PathBuf>,
    player_index: usize,
    playing: Option<Child>,
}

impl SystemBell {
    /// Resolves the sound once. A missing file is logged and replaced by a
    /// system sound, or by the terminal bell if none exists.
    pub fn load(requested: Option<&Path>) -> Self {
        let source = match requested {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => {
                log::warn!("Error loading sound: {}", path.display());
                None
            }
            None => None,
        }
        .or_else(|| {
            system_sounds()
                .iter()
                .map(PathBuf::from)
                .find(|path| path.is_file())
        });

        match &source {
            Some(path) => log::debug!("alert sound: {}", path.display()),
            None => log::debug!("alert sound: terminal bell"),
        }

        Self {
            source,
            player_index: 0,
            playing: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn spawn_player(&mut self, path: &Path) -> Option<Child> {
        let candidates = players();
        while self.player_index < candidates.len() {
            let player = candidates[self.player_index];
            match Command::new(player)
                .arg(path)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                Ok(child) => return Some(child),
                Err(e) => {
                    log::debug!("{} unavailable: {}", player, e);
                    self.player_index += 1;
                }
            }
        }
        None
    }
}

impl Alert for SystemBell {
    fn play(&mut self) {
        // one alert at a time
        self.stop();

        if let Some(path) = self.source.clone() {
            if let Some(child) = self.spawn_player(&path) {
                self.playing = Some(child);
                return;
            }
        }
        print!("\x07");
        std::io::stdout().flush().ok();
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.playing.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Drop for SystemBell {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `--no-sound`.
#[derive(Debug, Default)]
pub struct Silent;

impl Alert for Silent {
    fn play(&mut self) {}
    fn stop(&mut self) {}
}
