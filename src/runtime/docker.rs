//! Docker and docker-compose through the shell

use super::shell::{CommandStatus, Shell};
use crate::error::{DupError, Result};
use std::path::{Path, PathBuf};

/// Timeout environment passed to docker-compose, in seconds
pub const COMPOSE_TIMEOUT_SECS: u32 = 600;

/// Shell used by [`ContainerRuntime::exec_interactive`] by default
pub const DEFAULT_EXEC_SHELL: &str = "bash";

/// Build file created for new images
pub const DOCKERFILE: &str = "Dockerfile";

/// Operations the tool needs from a container runtime
pub trait ContainerRuntime {
    /// Bring up a compose file
    fn start(&self, compose_file: &Path, build: bool, detach: bool) -> Result<CommandStatus>;

    /// Stop and remove all containers, then prune networks
    fn stop(&self) -> Result<()>;

    /// Build the image in `path`, tagged with the same name
    fn build_image(&self, path: &str) -> Result<CommandStatus>;

    /// Run a single container from an image
    fn run_image(&self, image: &str, options: &str) -> Result<CommandStatus>;

    /// Open an interactive shell in a running container
    fn exec_interactive(&self, container: &str, shell: &str) -> Result<CommandStatus>;

    /// Force-remove every image
    fn clear_images(&self) -> Result<CommandStatus>;
}

/// [`ContainerRuntime`] backed by the `docker` and `docker-compose` CLIs
pub struct DockerCli<S: Shell> {
    shell: S,
}

impl<S: Shell> DockerCli<S> {
    /// Create a runtime using the given shell
    pub fn new(shell: S) -> Self {
        Self { shell }
    }

    /// Shell used for every command
    pub fn shell(&self) -> &S {
        &self.shell
    }

    fn call(&self, command: &str) -> Result<CommandStatus> {
        let status = self.shell.call(command)?;
        if !status.success() {
            tracing::warn!("'{}' finished with {}", command, status);
        }
        Ok(status)
    }
}

impl<S: Shell> ContainerRuntime for DockerCli<S> {
    fn start(&self, compose_file: &Path, build: bool, detach: bool) -> Result<CommandStatus> {
        let mut command = format!(
            "DOCKER_CLIENT_TIMEOUT={t} COMPOSE_HTTP_TIMEOUT={t} docker-compose -f {} up",
            compose_file.display(),
            t = COMPOSE_TIMEOUT_SECS
        );
        if build {
            command.push_str(" --build");
        }
        if detach {
            command.push_str(" -d");
        }

        tracing::info!("Starting {}", compose_file.display());
        self.call(&command)
    }

    fn stop(&self) -> Result<()> {
        tracing::info!("Removing all containers and unused networks");
        self.call("docker stop $(docker ps -a -q)")?;
        self.call("docker rm $(docker ps -a -q)")?;
        self.call("docker network prune -f")?;
        Ok(())
    }

    fn build_image(&self, path: &str) -> Result<CommandStatus> {
        tracing::info!("Building image {}", path);
        self.call(&format!("docker build {} -t {}", path, path))
    }

    fn run_image(&self, image: &str, options: &str) -> Result<CommandStatus> {
        let command = if options.trim().is_empty() {
            format!("docker run {}", image)
        } else {
            format!("docker run {} {}", options.trim(), image)
        };
        self.call(&command)
    }

    fn exec_interactive(&self, container: &str, shell: &str) -> Result<CommandStatus> {
        self.call(&format!("docker exec -it {} {}", container, shell))
    }

    fn clear_images(&self) -> Result<CommandStatus> {
        tracing::info!("Removing all images");
        self.call("docker rmi -f $(docker images -q -a)")
    }
}

/// Create `<image_dir><name>/Dockerfile` for a new image
pub fn create_image_template(image_dir: &str, name: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(format!("{}{}", image_dir, name));
    if dir.exists() {
        return Err(DupError::Image(format!(
            "image directory {} already exists",
            dir.display()
        )));
    }

    std::fs::create_dir_all(&dir)?;
    let dockerfile = dir.join(DOCKERFILE);
    std::fs::write(&dockerfile, "")?;
    tracing::info!("Created {}", dockerfile.display());
    Ok(dockerfile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::shell::testing::RecordingShell;
    use tempfile::tempdir;

    #[test]
    fn test_start_command() {
        let docker = DockerCli::new(RecordingShell::default());
        docker
            .start(Path::new("docker-compose.yml"), true, true)
            .unwrap();
        docker
            .start(Path::new("docker-compose.yml"), false, false)
            .unwrap();

        assert_eq!(
            docker.shell().calls(),
            vec![
                "DOCKER_CLIENT_TIMEOUT=600 COMPOSE_HTTP_TIMEOUT=600 docker-compose -f docker-compose.yml up --build -d",
                "DOCKER_CLIENT_TIMEOUT=600 COMPOSE_HTTP_TIMEOUT=600 docker-compose -f docker-compose.yml up",
            ]
        );
    }

    #[test]
    fn test_stop_ignores_failures() {
        let docker = DockerCli::new(RecordingShell::failing(&["docker stop $(docker ps -a -q)"]));
        docker.stop().unwrap();
        assert_eq!(docker.shell().calls().len(), 3);
    }

    #[test]
    fn test_image_commands() {
        let docker = DockerCli::new(RecordingShell::default());
        docker.build_image("web").unwrap();
        docker.run_image("web", "").unwrap();
        docker.run_image("web", "-p 80:80").unwrap();
        docker.exec_interactive("web-2", DEFAULT_EXEC_SHELL).unwrap();

        assert_eq!(
            docker.shell().calls(),
            vec![
                "docker build web -t web",
                "docker run web",
                "docker run -p 80:80 web",
                "docker exec -it web-2 bash",
            ]
        );
    }

    #[test]
    fn test_create_image_template() {
        let temp = tempdir().unwrap();
        let image_dir = format!("{}/", temp.path().display());

        let dockerfile = create_image_template(&image_dir, "web").unwrap();
        assert!(dockerfile.exists());
        assert_eq!(dockerfile, temp.path().join("web").join(DOCKERFILE));

        assert!(matches!(
            create_image_template(&image_dir, "web"),
            Err(DupError::Image(_))
        ));
    }
}
