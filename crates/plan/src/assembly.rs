//! Assembly of the full build-matrix plan.
//!
//! For every variant key the planner emits eight nodes: two configuration
//! artifacts, two image builds, two image tests, and two aggregation
//! shortcuts. The assembled set is validated as a DAG before being handed
//! to the external engine.

use crate::error::{Error, Result};
use crate::schema::{Action, GenerateStrategy, PlanDocument, TargetSpec};
use dockforge_core::{
    BuildContext, Flavor, MatrixConfig, TargetIdentity, TargetKind, VariantKey,
};
use dockforge_task_graph::{TaskGraph, TaskNode};
use std::collections::HashSet;
use tracing::debug;

/// Assembles the plan for one configuration and build context.
pub struct Planner<'a> {
    config: &'a MatrixConfig,
    context: &'a BuildContext,
}

impl<'a> Planner<'a> {
    /// Create a planner.
    #[must_use]
    pub fn new(config: &'a MatrixConfig, context: &'a BuildContext) -> Self {
        Self { config, context }
    }

    /// Assemble and validate the full plan.
    pub fn plan(&self) -> Result<PlanDocument> {
        let mut targets = Vec::new();
        for key in self.config.matrix().enumerate() {
            self.push_variant_targets(&mut targets, &key)?;
        }
        self.validate(&targets)?;
        debug!(targets = targets.len(), "Assembled plan");
        Ok(PlanDocument::new(targets))
    }

    fn push_variant_targets(&self, targets: &mut Vec<TargetSpec>, key: &VariantKey) -> Result<()> {
        // Resolving the source mapping here surfaces lookup-table gaps at
        // plan time, before any target runs.
        self.config.source_for(&key.os_variant)?;

        let transform = TargetIdentity::new(key.clone(), TargetKind::ConfigTransform);
        let template = TargetIdentity::new(key.clone(), TargetKind::ConfigTemplate);
        let build = TargetIdentity::new(
            key.clone(),
            TargetKind::Build {
                flavor: Flavor::Base,
            },
        );
        let build_s6 = TargetIdentity::new(key.clone(), TargetKind::Build { flavor: Flavor::S6 });
        let test = TargetIdentity::new(
            key.clone(),
            TargetKind::Test {
                flavor: Flavor::Base,
            },
        );
        let test_s6 = TargetIdentity::new(key.clone(), TargetKind::Test { flavor: Flavor::S6 });

        // Configuration artifacts.
        targets.push(TargetSpec {
            basename: transform.basename(),
            file_deps: vec![],
            task_deps: vec![],
            actions: vec![Action::Generate {
                strategy: GenerateStrategy::Transform,
                os_variant: key.os_variant.clone(),
                runtime_version: key.runtime_version.clone(),
            }],
        });
        targets.push(TargetSpec {
            basename: template.basename(),
            file_deps: vec![
                self.config.template_path.clone(),
                self.config.vars_path.clone(),
            ],
            task_deps: vec![],
            actions: vec![Action::Generate {
                strategy: GenerateStrategy::Template,
                os_variant: key.os_variant.clone(),
                runtime_version: key.runtime_version.clone(),
            }],
        });

        // Image builds. Each build consumes its config artifact as a file
        // dep so the engine rebuilds the image whenever the artifact moves.
        targets.push(TargetSpec {
            basename: build.basename(),
            file_deps: vec![transform.basename()],
            task_deps: vec![],
            actions: self.base_build_actions(key, &build),
        });
        targets.push(TargetSpec {
            basename: build_s6.basename(),
            file_deps: vec![template.basename()],
            task_deps: vec![],
            actions: self.s6_build_actions(key, &template, &build_s6),
        });

        // Image tests depend on their build at the task level.
        targets.push(self.test_target(&test, &build));
        targets.push(self.test_target(&test_s6, &build_s6));

        // Aggregation shortcuts: no actions of their own, they exist so a
        // whole variant pipeline can be requested by one name.
        targets.push(TargetSpec {
            basename: key.subdir(),
            file_deps: vec![],
            task_deps: vec![
                transform.basename(),
                template.basename(),
                build.basename(),
                build_s6.basename(),
            ],
            actions: vec![],
        });
        targets.push(TargetSpec {
            basename: format!("test-{}", key.subdir()),
            file_deps: vec![],
            task_deps: vec![test.basename(), test_s6.basename()],
            actions: vec![],
        });

        Ok(())
    }

    fn base_build_actions(&self, key: &VariantKey, build: &TargetIdentity) -> Vec<Action> {
        let full_tag = build.full_tag(&self.config.image);
        let mut actions = vec![Action::command([
            "docker".to_string(),
            "build".to_string(),
            "--pull".to_string(),
            "--iidfile".to_string(),
            build.basename(),
            "--tag".to_string(),
            full_tag.clone(),
            key.subdir(),
        ])];
        self.push_latest_alias(&mut actions, key, &full_tag);
        actions
    }

    fn s6_build_actions(
        &self,
        key: &VariantKey,
        template: &TargetIdentity,
        build: &TargetIdentity,
    ) -> Vec<Action> {
        let full_tag = build.full_tag(&self.config.image);
        let ctx = self.context;
        let mut argv = vec![
            "docker".to_string(),
            "build".to_string(),
            "--file".to_string(),
            template.basename(),
            "--iidfile".to_string(),
            build.basename(),
            "--tag".to_string(),
            full_tag.clone(),
        ];
        for (name, value) in [
            ("BUILD_DATE", &ctx.build_date),
            ("BUILD_URL", &ctx.build_url),
            ("BUILD_NUMBER", &ctx.build_number),
            ("GIT_COMMIT", &ctx.git_commit),
            ("GIT_COMMIT_DATE", &ctx.git_commit_date),
        ] {
            argv.push("--build-arg".to_string());
            argv.push(format!("{name}={value}"));
        }
        argv.push(self.config.s6_context.clone());

        let mut actions = vec![Action::Command { argv }];
        self.push_latest_alias(&mut actions, key, &full_tag);
        actions
    }

    /// Append the `latest` alias action for the designated latest version.
    fn push_latest_alias(&self, actions: &mut Vec<Action>, key: &VariantKey, full_tag: &str) {
        if !self.config.is_latest(&key.runtime_version) {
            return;
        }
        let repository = full_tag.split(':').next().unwrap_or(full_tag);
        actions.push(Action::command([
            "docker".to_string(),
            "tag".to_string(),
            full_tag.to_string(),
            format!("{repository}:latest"),
        ]));
    }

    fn test_target(&self, test: &TargetIdentity, build: &TargetIdentity) -> TargetSpec {
        let full_tag = test.full_tag(&self.config.image);

        let mut smoke = vec![
            "docker".to_string(),
            "run".to_string(),
            "--rm".to_string(),
            full_tag.clone(),
        ];
        smoke.extend(self.config.smoke_command.iter().cloned());

        TargetSpec {
            basename: test.basename(),
            file_deps: vec![],
            task_deps: vec![build.basename()],
            actions: vec![
                Action::Command { argv: smoke },
                // Advisory scan: findings are reported but never block.
                Action::Command {
                    argv: self.scan_argv("HIGH", 0, &full_tag),
                },
                // Blocking scan: a finding fails the target.
                Action::Command {
                    argv: self.scan_argv("CRITICAL", 1, &full_tag),
                },
            ],
        }
    }

    /// Scanner invocation at one severity threshold.
    ///
    /// In CI the scan is delegated to the remote scan server; locally the
    /// image is scanned directly.
    fn scan_argv(&self, severity: &str, exit_code: u8, full_tag: &str) -> Vec<String> {
        let mut argv = vec!["trivy".to_string()];
        if self.context.ci {
            argv.push("client".to_string());
            argv.push("--remote".to_string());
            argv.push(self.config.scan_server.clone());
        } else {
            argv.push("image".to_string());
        }
        argv.push("--severity".to_string());
        argv.push(severity.to_string());
        argv.push("--exit-code".to_string());
        argv.push(exit_code.to_string());
        argv.push(full_tag.to_string());
        argv
    }

    /// Validate the assembled targets as a DAG.
    ///
    /// Task-level deps must always resolve to targets; file-level deps only
    /// induce edges when they name another target's basename (plain input
    /// files like the template source are legitimate file deps without
    /// being tasks).
    fn validate(&self, targets: &[TargetSpec]) -> Result<()> {
        let known: HashSet<&str> = targets.iter().map(|t| t.basename.as_str()).collect();

        let mut graph = TaskGraph::new();
        for target in targets {
            let mut deps: Vec<String> = target.task_deps.clone();
            deps.extend(
                target
                    .file_deps
                    .iter()
                    .filter(|d| known.contains(d.as_str()))
                    .cloned(),
            );
            graph.add_task(&target.basename, PlanNode { deps })?;
        }
        graph.add_dependency_edges()?;

        let result = graph.validate();
        if let Some(error) = result.errors.into_iter().next() {
            return Err(Error::from(error));
        }
        Ok(())
    }
}

/// Minimal node adapter feeding targets into the validation graph.
#[derive(Debug, Clone)]
struct PlanNode {
    deps: Vec<String>,
}

impl TaskNode for PlanNode {
    fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.deps.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_inputs(ci: bool) -> (MatrixConfig, BuildContext) {
        let context = BuildContext {
            build_url: "http://buildhost".to_string(),
            build_date: "2024-01-01T00:00:00+00:00".to_string(),
            build_number: "42".to_string(),
            git_commit: "abcdef0".to_string(),
            git_commit_date: "2024-01-01".to_string(),
            ci,
        };
        (MatrixConfig::default(), context)
    }

    fn find<'p>(plan: &'p PlanDocument, basename: &str) -> &'p TargetSpec {
        plan.targets
            .iter()
            .find(|t| t.basename == basename)
            .unwrap_or_else(|| panic!("no target {basename}"))
    }

    fn command_argvs(target: &TargetSpec) -> Vec<&Vec<String>> {
        target
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::Command { argv } => Some(argv),
                Action::Generate { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_plan_has_eight_nodes_per_variant() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();
        assert_eq!(plan.targets.len(), config.matrix().len() * 8);
    }

    #[test]
    fn test_build_depends_on_its_artifact() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let build = find(&plan, "3.10/jammy/Dockerimage");
        assert_eq!(build.file_deps, vec!["3.10/jammy/Dockerfile"]);

        let build_s6 = find(&plan, "3.10/jammy/with-s6.Dockerimage");
        assert_eq!(build_s6.file_deps, vec!["3.10/jammy/with-s6.Dockerfile"]);
    }

    #[test]
    fn test_template_target_depends_on_template_inputs() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let template = find(&plan, "3.9/jammy/with-s6.Dockerfile");
        assert_eq!(
            template.file_deps,
            vec!["s6-Dockerfile.jinja", "s6-vars.json"]
        );
        assert!(matches!(
            template.actions[0],
            Action::Generate {
                strategy: GenerateStrategy::Template,
                ..
            }
        ));
    }

    #[test]
    fn test_base_build_argv_shape() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let build = find(&plan, "3.9/slim-jammy/Dockerimage");
        let argvs = command_argvs(build);
        assert_eq!(argvs.len(), 1);
        assert_eq!(
            argvs[0],
            &vec![
                "docker",
                "build",
                "--pull",
                "--iidfile",
                "3.9/slim-jammy/Dockerimage",
                "--tag",
                "registry.example.com/ci/python:3.9-slim",
                "3.9/slim-jammy",
            ]
        );
    }

    #[test]
    fn test_latest_version_gets_alias_action() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        // Only the designated latest version carries the extra tag action.
        let latest = find(&plan, "3.10/jammy/Dockerimage");
        let argvs = command_argvs(latest);
        assert_eq!(argvs.len(), 2);
        assert_eq!(
            argvs[1],
            &vec![
                "docker",
                "tag",
                "registry.example.com/ci/python:3.10",
                "registry.example.com/ci/python:latest",
            ]
        );

        for version in ["3.7", "3.8", "3.9", "3.11-rc"] {
            let build = find(&plan, &format!("{version}/jammy/Dockerimage"));
            assert_eq!(command_argvs(build).len(), 1, "{version} must not alias");
        }
    }

    #[test]
    fn test_s6_build_carries_metadata_args() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let build = find(&plan, "3.9/jammy/with-s6.Dockerimage");
        let argv = command_argvs(build)[0];
        assert_eq!(argv[0..4], ["docker", "build", "--file", "3.9/jammy/with-s6.Dockerfile"]);
        assert!(argv.contains(&"BUILD_DATE=2024-01-01T00:00:00+00:00".to_string()));
        assert!(argv.contains(&"BUILD_URL=http://buildhost".to_string()));
        assert!(argv.contains(&"BUILD_NUMBER=42".to_string()));
        assert!(argv.contains(&"GIT_COMMIT=abcdef0".to_string()));
        assert_eq!(argv.last().unwrap(), "s6-context");
        // The s6 image shares the image name and differs only in subtag.
        assert!(argv.contains(&"registry.example.com/ci/python:3.9-s6".to_string()));
    }

    #[test]
    fn test_test_target_depends_on_build_and_gates_severities() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let test = find(&plan, "3.9/jammy/Dockerimage.test");
        assert_eq!(test.task_deps, vec!["3.9/jammy/Dockerimage"]);

        let argvs = command_argvs(test);
        assert_eq!(argvs.len(), 3);
        assert_eq!(
            argvs[0],
            &vec![
                "docker",
                "run",
                "--rm",
                "registry.example.com/ci/python:3.9",
                "python",
                "--version",
            ]
        );
        // Advisory scan never blocks; blocking scan propagates its failure.
        assert_eq!(
            argvs[1],
            &vec![
                "trivy",
                "image",
                "--severity",
                "HIGH",
                "--exit-code",
                "0",
                "registry.example.com/ci/python:3.9",
            ]
        );
        assert_eq!(
            argvs[2],
            &vec![
                "trivy",
                "image",
                "--severity",
                "CRITICAL",
                "--exit-code",
                "1",
                "registry.example.com/ci/python:3.9",
            ]
        );
    }

    #[test]
    fn test_ci_context_scans_through_remote_server() {
        let (config, context) = planner_inputs(true);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let test = find(&plan, "3.9/jammy/Dockerimage.test");
        let argvs = command_argvs(test);
        assert_eq!(
            argvs[1][0..3],
            ["trivy", "client", "--remote"],
        );
        assert_eq!(argvs[1][3], "http://trivy.service.consul");
    }

    #[test]
    fn test_shortcut_nodes_aggregate_exactly_the_pipeline() {
        let (config, context) = planner_inputs(false);
        let plan = Planner::new(&config, &context).plan().unwrap();

        let shortcut = find(&plan, "3.10/slim-jammy");
        assert!(shortcut.actions.is_empty());
        assert_eq!(
            shortcut.task_deps,
            vec![
                "3.10/slim-jammy/Dockerfile",
                "3.10/slim-jammy/with-s6.Dockerfile",
                "3.10/slim-jammy/Dockerimage",
                "3.10/slim-jammy/with-s6.Dockerimage",
            ]
        );

        let test_shortcut = find(&plan, "test-3.10/slim-jammy");
        assert!(test_shortcut.actions.is_empty());
        assert_eq!(
            test_shortcut.task_deps,
            vec![
                "3.10/slim-jammy/Dockerimage.test",
                "3.10/slim-jammy/with-s6.Dockerimage.test",
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let (config, context) = planner_inputs(false);
        let first = Planner::new(&config, &context).plan().unwrap();
        let second = Planner::new(&config, &context).plan().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_unmapped_variant_fails_at_plan_time() {
        let (mut config, context) = planner_inputs(false);
        config.os_variants.push("noble".into());
        let err = Planner::new(&config, &context).plan().unwrap_err();
        assert!(matches!(
            err,
            Error::Core(dockforge_core::Error::MissingSourceMapping { .. })
        ));
    }
}
