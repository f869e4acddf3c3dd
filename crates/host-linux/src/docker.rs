use crate::plan::ActionPlan;
use reclaim_exec::CommandSpec;
use reclaim_safety::Confirmation;

pub const VOLUME_PHRASE: &str = "DELETE VOLUMES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerAction {
    StorageDetails,
    ListContainers,
    ListImages,
    ListVolumes,
    PruneStoppedContainers,
    PruneDanglingImages,
    PruneNetworks,
    PruneBuildCache,
    PruneAllUnusedImages,
    PruneVolumes,
    SafeCleanup,
}

impl DockerAction {
    pub const ALL: [DockerAction; 11] = [
        DockerAction::StorageDetails,
        DockerAction::ListContainers,
        DockerAction::ListImages,
        DockerAction::ListVolumes,
        DockerAction::PruneStoppedContainers,
        DockerAction::PruneDanglingImages,
        DockerAction::PruneNetworks,
        DockerAction::PruneBuildCache,
        DockerAction::PruneAllUnusedImages,
        DockerAction::PruneVolumes,
        DockerAction::SafeCleanup,
    ];

    pub fn menu_label(&self) -> &'static str {
        match self {
            DockerAction::StorageDetails => "Show Docker storage details",
            DockerAction::ListContainers => "List all containers (running & stopped)",
            DockerAction::ListImages => "List all images",
            DockerAction::ListVolumes => "List all volumes",
            DockerAction::PruneStoppedContainers => "Remove stopped containers (SAFE)",
            DockerAction::PruneDanglingImages => "Remove dangling images (SAFE)",
            DockerAction::PruneNetworks => "Remove unused networks (SAFE)",
            DockerAction::PruneBuildCache => "Remove build cache (SAFE)",
            DockerAction::PruneAllUnusedImages => "Remove ALL unused images (removes images not in use)",
            DockerAction::PruneVolumes => "Remove unused volumes (DANGEROUS - may lose data!)",
            DockerAction::SafeCleanup => "Safe Docker cleanup (containers + dangling images + build cache)",
        }
    }

    /// Risk shown next to the menu entry: 0 safe, 1 caution, 2 data loss.
    pub fn risk(&self) -> u8 {
        match self {
            DockerAction::PruneAllUnusedImages => 1,
            DockerAction::PruneVolumes => 2,
            _ => 0,
        }
    }

    pub fn plan(&self) -> ActionPlan {
        match self {
            DockerAction::StorageDetails => {
                ActionPlan::new("Docker Storage Details", "").step(docker("system df -v"))
            }
            DockerAction::ListContainers => ActionPlan::new("Docker Containers", "").step(docker("ps -a")),
            DockerAction::ListImages => ActionPlan::new("Docker Images", "").step(docker("images -a")),
            DockerAction::ListVolumes => ActionPlan::new("Docker Volumes", "").step(docker("volume ls")),
            DockerAction::PruneStoppedContainers => {
                ActionPlan::new("Remove Stopped Containers", "Stopped containers removed")
                    .preview(docker("ps -a -f status=exited -f status=created"))
                    .confirm(Confirmation::yes_no("\nRemove these stopped containers?"))
                    .step(docker("container prune -f"))
            }
            DockerAction::PruneDanglingImages => {
                ActionPlan::new("Remove Dangling Images", "Dangling images removed")
                    .preview(docker("images -f dangling=true"))
                    .confirm(Confirmation::yes_no("\nRemove these dangling images?"))
                    .step(docker("image prune -f"))
            }
            DockerAction::PruneNetworks => {
                ActionPlan::new("Remove Unused Networks", "Unused networks removed").step(docker("network prune -f"))
            }
            DockerAction::PruneBuildCache => ActionPlan::new("Remove Build Cache", "Build cache removed")
                .preview(docker("system df"))
                .confirm(Confirmation::twice(
                    "\nRemove all build cache?",
                    "This will remove ALL build cache. Are you sure?",
                ))
                .step(docker("builder prune -a -f")),
            DockerAction::PruneAllUnusedImages => {
                ActionPlan::new("Remove ALL Unused Images", "Unused images removed")
                    .warn("This will remove ALL images not associated with a container")
                    .warn("If you have stopped containers, their images will be deleted!")
                    .preview(docker("images -a"))
                    .confirm(Confirmation::twice(
                        "\nProceed with removal?",
                        "Are you ABSOLUTELY sure? This cannot be undone!",
                    ))
                    .step(docker("image prune -a -f"))
            }
            DockerAction::PruneVolumes => {
                ActionPlan::new("Remove Unused Volumes - DANGEROUS!", "Unused volumes removed")
                    .warn("WARNING: This operation can cause DATA LOSS!")
                    .warn("Volumes contain persistent data like databases and configurations")
                    .warn("Only volumes not mounted to ANY container (running or stopped) will be removed")
                    .preview(docker("volume ls"))
                    .preview(docker("volume ls -f dangling=true"))
                    .confirm(Confirmation::typed_phrase(
                        "\nDo you understand this may cause data loss?",
                        VOLUME_PHRASE,
                    ))
                    .step(docker("volume prune -f"))
            }
            DockerAction::SafeCleanup => ActionPlan::new("Safe Docker Cleanup", "Safe Docker cleanup completed!")
                .warn("This will remove stopped containers, dangling images, unused networks and build cache")
                .warn("This will NOT remove volumes or images in use")
                .confirm(Confirmation::yes_no("\nProceed with safe cleanup?"))
                .step(docker("container prune -f"))
                .step(docker("image prune -f"))
                .step(docker("network prune -f"))
                .step(docker("builder prune -a -f"))
                .followup(docker("system df")),
        }
    }
}

pub fn storage_summary() -> CommandSpec {
    docker("system df")
}

fn docker(args: &str) -> CommandSpec {
    CommandSpec::shell(format!("docker {}", args))
}
