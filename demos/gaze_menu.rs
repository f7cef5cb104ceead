use color_eyre::eyre::Result;
use stardust_xr_blocks::{
	audio::{AudioClip, AudioService, PlayParams, SoundSettings, SourceId},
	audio_block::{AudioBlockSettings, ExitBehavior, PlaybackMode},
	button::{ButtonSettings, FillSoundSettings, PitchRamp, SelectionResponse},
	loader::{LoadError, PendingClip, ResourceLoader},
	rules::{ReactiveRule, ReactiveRules},
	tween::Easing,
	visual_block::{VisualBlockSettings, VisualKind},
	visuals::{Decoration, Transition, VisualState, Visuals},
	BlockId, Session,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME: f32 = 0.02;

struct LogAudio;
impl AudioService for LogAudio {
	fn play_one_shot(&mut self, clip: &AudioClip, volume: f32) {
		info!(clip = clip.name(), volume, "one shot");
	}
	fn play(&mut self, source: SourceId, clip: &AudioClip, params: PlayParams) {
		info!(?source, clip = clip.name(), ?params, "play");
	}
	fn set_volume(&mut self, _source: SourceId, _volume: f32) {}
	fn set_pitch(&mut self, _source: SourceId, _pitch: f32) {}
	fn stop(&mut self, source: SourceId) {
		info!(?source, "stop");
	}
}

struct LogVisuals;
impl Visuals for LogVisuals {
	fn set_decoration(
		&mut self,
		block: BlockId,
		decoration: Decoration,
		state: VisualState,
		transition: Transition,
	) {
		info!(?block, ?decoration, ?state, ?transition, "decoration");
	}
	fn set_collider(&mut self, _block: BlockId, _enabled: bool) {}
	fn set_idle_animation(&mut self, _block: BlockId, _playing: bool) {}
	fn set_gaze_growable(&mut self, _block: BlockId, _enabled: bool) {}
	fn set_fill_amount(&mut self, _block: BlockId, _amount: f32) {}
}

/// Pretends to fetch clips from somewhere slow.
struct SlowLoader {
	latency: Duration,
}
impl ResourceLoader for SlowLoader {
	fn load_audio_clip(&mut self, path: &str, _cache_if_remote: bool) -> PendingClip {
		let (sender, pending) = PendingClip::channel();
		let path = path.to_string();
		let latency = self.latency;
		tokio::spawn(async move {
			tokio::time::sleep(latency).await;
			let result = match path.rsplit_once('.') {
				Some((name, "ogg")) => Ok(AudioClip::new(name)),
				_ => Err(LoadError::NotFound(path)),
			};
			let _ = sender.send(result);
		});
		pending
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let mut session = Session::new(
		LogAudio,
		LogVisuals,
		SlowLoader {
			latency: Duration::from_millis(300),
		},
	);
	let menu = session.create_group("menu");

	let mut play_settings = ButtonSettings {
		dwell_duration: 1.5,
		on_selected: SelectionResponse::DisableSelf,
		..Default::default()
	};
	play_settings.sounds.fill = Some(FillSoundSettings {
		sound: SoundSettings::path("sfx/fill.ogg").volume(0.6),
		pitch_ramp: Some(PitchRamp {
			to: 1.5,
			easing: Easing::QuadIn,
		}),
	});
	play_settings.sounds.select = Some(SoundSettings::path("sfx/select.ogg"));
	let play = session.create_button(Some(menu), "play", play_settings)?;

	let back = session.create_button(
		Some(menu),
		"back",
		ButtonSettings {
			on_selected: SelectionResponse::HideSelf,
			visible_at_start: false,
			..Default::default()
		},
	)?;
	let music = session.create_audio(
		Some(menu),
		"music",
		AudioBlockSettings {
			sound: Some(SoundSettings::path("music/theme.ogg")),
			looping: true,
			playback: PlaybackMode::EndWhenGazeExits {
				on_exit: ExitBehavior::FadeOut {
					length: 1.0,
					delay: 0.0,
				},
				fade_in_on_reenter: false,
			},
			..Default::default()
		},
	)?;
	let poster = session.create_visual(
		None,
		"poster",
		VisualBlockSettings {
			kind: VisualKind::Image,
			visible_at_start: false,
			..Default::default()
		},
	)?;

	session.set_rules(
		back,
		ReactiveRules {
			show_when: ReactiveRule::OnSpecificBlocksSelected(vec![play]),
			..Default::default()
		},
	)?;
	session.set_rules(
		poster,
		ReactiveRules {
			show_when: ReactiveRule::OnSpecificBlocksSelected(vec![play]),
			hide_when: ReactiveRule::OnSpecificBlocksSelected(vec![back]),
			..Default::default()
		},
	)?;
	session.set_rules(
		play,
		ReactiveRules {
			enable_when: ReactiveRule::OnSpecificBlocksSelected(vec![back]),
			..Default::default()
		},
	)?;

	// frame number, what the user's gaze does
	let script: &[(u32, &str, BlockId, bool)] = &[
		(10, "glance at play", play, true),
		(50, "look away", play, false),
		(80, "look back", play, true),
		(160, "leave play", play, false),
		(200, "look at back", back, true),
		(270, "leave back", back, false),
	];

	let mut interval = tokio::time::interval(Duration::from_secs_f32(FRAME));
	for frame in 0..320 {
		interval.tick().await;
		for (_, label, block, enter) in script.iter().filter(|(at, ..)| *at == frame) {
			info!(frame, label, "gaze");
			if *enter {
				session.gaze_enter(*block);
			} else {
				session.gaze_exit(*block);
			}
		}
		session.update(FRAME);
		for event in session.drain_events() {
			info!(block = ?event.block, kind = ?event.kind, "event");
		}
	}

	info!(
		focused = ?session.focus().focused(menu),
		music_playing = session
			.audio(music)
			.is_some_and(|music| music.is_playing(session.context())),
		"done"
	);
	Ok(())
}
