//! Inference command invocation builder.
//!
//! Turns a profile and a fold layout into the exact argument list the
//! toolkit's `binary_class_inf.py` entry point expects. The order of the
//! fixed flags never changes; callers can only append.

use std::path::{Path, PathBuf};

use ddi_core::{InferenceProfile, LaunchPlan, RunLayout};

/// Environment variable selecting visible accelerators.
pub const CUDA_VISIBLE_DEVICES: &str = "CUDA_VISIBLE_DEVICES";

/// Builder for constructing entry point invocations.
///
/// # Example
///
/// ```rust,ignore
/// let plan = InferenceCommandBuilder::new(python, entry_point, &layout)
///     .profile(&profile)
///     .user_dir(user_dir)
///     .arg("--seed", "1")
///     .build();
/// ```
pub struct InferenceCommandBuilder {
    interpreter: PathBuf,
    entry_point: PathBuf,
    layout: RunLayout,
    profile: InferenceProfile,
    user_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    additional_args: Vec<(String, Option<String>)>,
}

impl InferenceCommandBuilder {
    /// Create a builder for one fold; the profile starts at its defaults.
    pub fn new(
        interpreter: impl Into<PathBuf>,
        entry_point: impl Into<PathBuf>,
        layout: &RunLayout,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            entry_point: entry_point.into(),
            layout: layout.clone(),
            profile: InferenceProfile::default(),
            user_dir: None,
            working_dir: None,
            additional_args: Vec::new(),
        }
    }

    /// Use this flag set instead of the defaults.
    pub fn profile(mut self, profile: &InferenceProfile) -> Self {
        self.profile = profile.clone();
        self
    }

    /// Directory holding the toolkit plugins (`--user-dir`).
    pub fn user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    /// Run the process from this directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add a flag with a value after the fixed flags.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_args.push((key.into(), Some(value.into())));
        self
    }

    /// Add a boolean flag after the fixed flags.
    pub fn flag(mut self, key: impl Into<String>) -> Self {
        self.additional_args.push((key.into(), None));
        self
    }

    /// Build the final plan.
    ///
    /// The argument list is:
    /// 1. Entry point script and data directory (positional)
    /// 2. Checkpoint, plugin directory, DDP backend, dataloader reset
    /// 3. Source / target tags
    /// 4. Task, model and loss flags
    /// 5. GNN overrides, if any
    /// 6. Precision, progress bar, evaluated subset
    /// 7. Builder extras, then the profile's `extra_args`
    pub fn build(self) -> LaunchPlan {
        let p = &self.profile;
        let mut args = Args::default();

        args.positional(path_arg(&self.entry_point));
        args.positional(path_arg(&self.layout.data_dir));

        args.value("--restore-file", path_arg(&self.layout.checkpoint_path));
        if let Some(dir) = &self.user_dir {
            args.value("--user-dir", path_arg(dir));
        }
        args.value("--ddp-backend", p.ddp_backend.to_string());
        if p.reset_dataloader {
            args.positional("--reset-dataloader");
        }

        args.value("-s", &p.source_lang);
        args.value("-t", &p.target_lang);

        args.value("--task", &p.task);
        args.value("--arch", p.arch.name());
        args.value("--criterion", &p.criterion);
        args.value("--max-positions", p.max_positions.to_string());
        args.value("--batch-size", p.batch_size.to_string());
        args.value("--optimizer", &p.optimizer);
        args.value("--gnn-norm", p.gnn_norm.to_string());
        args.value("--classification-head-name", p.classification_head.name());
        args.value("--num-classes", p.num_classes.to_string());

        if let Some(layers) = p.gnn_number_layer {
            args.value("--gnn-number-layer", layers.to_string());
        }
        if let Some(dim) = p.gnn_embed_dim {
            args.value("--gnn-embed-dim", dim.to_string());
        }

        if let Some(flag) = p.precision.flag() {
            args.positional(flag);
        }
        if p.no_progress_bar {
            args.positional("--no-progress-bar");
        }
        args.value("--valid-subset", &p.valid_subset);

        for (key, value) in self.additional_args {
            args.positional(key);
            if let Some(value) = value {
                args.positional(value);
            }
        }
        for extra in &p.extra_args {
            args.positional(extra);
        }

        LaunchPlan {
            program: self.interpreter,
            args: args.0,
            envs: vec![
                (CUDA_VISIBLE_DEVICES.to_string(), p.device.env_value()),
                ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
            ],
            working_dir: self.working_dir,
        }
    }
}

#[derive(Default)]
struct Args(Vec<String>);

impl Args {
    fn positional(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    fn value(&mut self, flag: &str, value: impl Into<String>) {
        self.0.push(flag.to_string());
        self.0.push(value.into());
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddi_core::{DeviceSelection, Fold, Precision};

    fn layout() -> RunLayout {
        RunLayout::derive(
            Path::new("/data"),
            Path::new("/ckpt"),
            &InferenceProfile::default(),
            &Fold::new("fold0").unwrap(),
        )
    }

    fn build(profile: &InferenceProfile) -> LaunchPlan {
        InferenceCommandBuilder::new("/usr/bin/python3", "/zoo/binary_class_inf.py", &layout())
            .profile(profile)
            .user_dir("/zoo")
            .build()
    }

    #[test]
    fn positionals_come_first() {
        let plan = build(&InferenceProfile::default());
        assert_eq!(plan.program, PathBuf::from("/usr/bin/python3"));
        assert_eq!(plan.args[0], "/zoo/binary_class_inf.py");
        assert_eq!(plan.args[1], "/data/fold0/data-bin");
        assert_eq!(plan.args[2], "--restore-file");
    }

    #[test]
    fn user_dir_is_omitted_when_unset() {
        let plan =
            InferenceCommandBuilder::new("python3", "infer.py", &layout()).build();
        assert!(!plan.has_flag("--user-dir"));
    }

    #[test]
    fn precision_selects_flag() {
        let fp32 = build(&InferenceProfile {
            precision: Precision::Fp32,
            ..Default::default()
        });
        assert!(!fp32.has_flag("--fp16"));
        assert!(!fp32.has_flag("--bf16"));

        let bf16 = build(&InferenceProfile {
            precision: Precision::Bf16,
            ..Default::default()
        });
        assert!(bf16.has_flag("--bf16"));
    }

    #[test]
    fn optional_flags_follow_profile() {
        let plan = build(&InferenceProfile {
            reset_dataloader: false,
            no_progress_bar: false,
            gnn_number_layer: Some(6),
            ..Default::default()
        });
        assert!(!plan.has_flag("--reset-dataloader"));
        assert!(!plan.has_flag("--no-progress-bar"));
        assert_eq!(plan.flag_value("--gnn-number-layer"), Some("6"));
        assert!(!plan.has_flag("--gnn-embed-dim"));
    }

    #[test]
    fn extras_are_appended_in_order() {
        let profile = InferenceProfile {
            extra_args: vec!["--seed".to_string(), "7".to_string()],
            ..Default::default()
        };
        let plan = InferenceCommandBuilder::new("python3", "infer.py", &layout())
            .profile(&profile)
            .arg("--num-workers", "2")
            .flag("--cpu")
            .build();

        let tail: Vec<&str> = plan.args[plan.args.len() - 5..]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(tail, ["--num-workers", "2", "--cpu", "--seed", "7"]);
    }

    #[test]
    fn device_selection_sets_env() {
        let plan = build(&InferenceProfile {
            device: "1,3".parse().unwrap(),
            ..Default::default()
        });
        assert_eq!(plan.env(CUDA_VISIBLE_DEVICES), Some("1,3"));
        assert_eq!(plan.env("PYTHONUNBUFFERED"), Some("1"));

        let cpu = build(&InferenceProfile {
            device: DeviceSelection::None,
            ..Default::default()
        });
        assert_eq!(cpu.env(CUDA_VISIBLE_DEVICES), Some(""));
    }
}
