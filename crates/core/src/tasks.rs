//! Built-in tasks
//!
//! The first group bootstraps a Python toolchain (fetch and install
//! miniconda, create a conda environment) and is project independent. The
//! second group installs this project's dependencies and runs its lint, test
//! and documentation commands.

use crate::params::{expand_home, Param};
use crate::platform::Platform;
use crate::task::{Action, TaskDescriptor};

/// Every built-in task in registration order
pub fn builtin_tasks(platform: Platform) -> Vec<TaskDescriptor> {
    vec![
        download_miniconda(platform),
        install_miniconda(platform),
        create_env(),
        install_required_dependencies(),
        install_test_dependencies(),
        install_doc_dependencies(),
        lint(),
        tests(),
        docs(),
    ]
}

// general

/// Fetch the platform's miniconda installer into the working directory.
///
/// Has no inputs, so once the installer exists it is never fetched again.
pub fn download_miniconda(platform: Platform) -> TaskDescriptor {
    let installer = platform.miniconda_installer();
    TaskDescriptor::new("download_miniconda")
        .doc("Download the miniconda installer for this platform")
        .target(installer)
        .uptodate(true)
        .action(Action::Download {
            url: platform.miniconda_url().to_string(),
            dest: installer.into(),
        })
}

pub fn install_miniconda(platform: Platform) -> TaskDescriptor {
    let installer = platform.miniconda_installer();
    let location = Param::string("location", expand_home("~/miniconda"))
        .short('l')
        .help("Directory to install miniconda into");

    let command = if platform.is_windows() {
        format!("START /WAIT {} /S /AddToPath=0 /D=%(location)s", installer)
    } else {
        format!("bash {} -b -p %(location)s", installer)
    };

    // could track the installation directory as a target instead
    TaskDescriptor::new("install_miniconda")
        .doc("Run the miniconda installer")
        .file_dep(installer)
        .uptodate(false)
        .param(location)
        .shell(command)
}

pub fn create_env() -> TaskDescriptor {
    TaskDescriptor::new("create_env")
        .doc("Create a conda environment")
        .param(Param::string("python", "3.6").help("Python version"))
        .param(Param::string("name", "test-environment").help("Environment name"))
        .shell("conda create -y --name %(name)s python=%(python)s")
}

// specific to this project

pub fn install_required_dependencies() -> TaskDescriptor {
    TaskDescriptor::new("install_required_dependencies")
        .doc("Install required dependencies")
        .shell(r#"conda install -y -q -c conda-forge param "bokeh>=0.12.10""#)
}

pub fn install_test_dependencies() -> TaskDescriptor {
    TaskDescriptor::new("install_test_dependencies")
        .doc("Install dependencies needed to run the tests")
        .shell(r#"conda install -y -q -c conda-forge "holoviews>=1.9.0" pandas notebook flake8 pyparsing pytest"#)
        .shell("pip install pytest-nbsmoke")
        .task_dep("install_required_dependencies")
}

pub fn install_doc_dependencies() -> TaskDescriptor {
    TaskDescriptor::new("install_doc_dependencies")
        .doc("Install dependencies needed to build the docs")
        .shell("conda install -y -q -c conda-forge notebook ipython sphinx beautifulsoup4 graphviz selenium phantomjs")
        .shell("pip install nbsite sphinx_ioam_theme")
        .task_dep("install_test_dependencies")
}

pub fn lint() -> TaskDescriptor {
    TaskDescriptor::new("lint")
        .doc("Lint the package and the example notebooks")
        .shell("flake8 --ignore E,W parambokeh")
        .shell("pytest --nbsmoke-lint examples/")
}

pub fn tests() -> TaskDescriptor {
    TaskDescriptor::new("tests")
        .doc("Run the example notebooks")
        .shell("pytest --nbsmoke-run examples/")
}

/// Build the HTML docs under `./doc/_build/html`.
///
/// Expects `install_doc_dependencies` to have been run beforehand.
pub fn docs() -> TaskDescriptor {
    TaskDescriptor::new("docs")
        .doc("Build the documentation")
        .shell("nbsite_nbpagebuild.py ioam parambokeh ./examples ./doc")
        .shell("sphinx-build -b html ./doc ./doc/_build/html")
        .shell("nbsite_fix_links.py ./doc/_build/html")
        .shell("touch ./doc/_build/html/.nojekyll")
        .shell("nbsite_cleandisthtml.py ./doc/_build/html take_a_chance")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{parse_params, substitute};
    use std::path::PathBuf;

    fn render(task: &TaskDescriptor, args: &[&str]) -> Vec<String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let values = parse_params(&task.params, &args).unwrap();
        task.actions
            .iter()
            .map(|a| match a {
                Action::Shell(cmd) => substitute(cmd, &values).unwrap(),
                other => other.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_download_targets_installer_for_each_platform() {
        for platform in [Platform::Windows, Platform::Linux, Platform::Darwin] {
            let task = download_miniconda(platform);
            assert_eq!(task.targets, vec![PathBuf::from(platform.miniconda_installer())]);
            assert_eq!(task.uptodate, vec![true]);
            assert_eq!(
                task.actions,
                vec![Action::Download {
                    url: platform.miniconda_url().to_string(),
                    dest: PathBuf::from(platform.miniconda_installer()),
                }]
            );
        }
    }

    #[test]
    fn test_install_depends_on_installer_and_always_runs() {
        let task = install_miniconda(Platform::Linux);
        assert_eq!(
            task.file_dep,
            vec![PathBuf::from("Miniconda3-latest-Linux-x86_64.sh")]
        );
        assert_eq!(task.uptodate, vec![false]);
    }

    #[test]
    fn test_install_location_override_unix() {
        let task = install_miniconda(Platform::Linux);
        let commands = render(&task, &["--location", "/opt/conda"]);
        assert_eq!(
            commands,
            vec!["bash Miniconda3-latest-Linux-x86_64.sh -b -p /opt/conda"]
        );
        assert!(commands[0].contains("-p /opt/conda"));
    }

    #[test]
    fn test_install_location_short_flag_windows() {
        let task = install_miniconda(Platform::Windows);
        let commands = render(&task, &["-l", r"C:\conda"]);
        assert_eq!(
            commands,
            vec![r"START /WAIT Miniconda3-latest-Windows-x86_64.exe /S /AddToPath=0 /D=C:\conda"]
        );
    }

    #[test]
    fn test_install_default_location_is_expanded() {
        let task = install_miniconda(Platform::Darwin);
        let commands = render(&task, &[]);
        let expected = expand_home("~/miniconda");
        assert!(!expected.starts_with('~') || dirs::home_dir().is_none());
        assert!(commands[0].ends_with(&format!("-p {}", expected)));
    }

    #[test]
    fn test_create_env_defaults() {
        let commands = render(&create_env(), &[]);
        assert_eq!(
            commands,
            vec!["conda create -y --name test-environment python=3.6"]
        );
    }

    #[test]
    fn test_create_env_overrides() {
        let commands = render(&create_env(), &["--python", "3.7", "--name=dev"]);
        assert_eq!(commands, vec!["conda create -y --name dev python=3.7"]);
    }

    #[test]
    fn test_dependency_chain_order() {
        assert!(install_required_dependencies().task_dep.is_empty());
        assert_eq!(
            install_test_dependencies().task_dep,
            vec!["install_required_dependencies"]
        );
        assert_eq!(
            install_doc_dependencies().task_dep,
            vec!["install_test_dependencies"]
        );
    }

    #[test]
    fn test_project_tasks_always_run() {
        for task in [lint(), tests(), docs()] {
            assert!(!task.is_trackable(), "{} should always run", task.name);
            assert!(task.task_dep.is_empty());
        }
        assert_eq!(docs().actions.len(), 5);
    }
}
