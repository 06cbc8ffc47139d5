use std::path::Path;

use git2::{IndexAddOption, Oid, Repository};
use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

/// Wrapper around git2 Repository for release commits, tags and pushes.
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Opens the repository containing `path`.
    ///
    /// Searches `path` and its parent directories.
    ///
    /// # Returns
    /// * `Ok(GitRepo)` - Successfully initialized repository wrapper
    /// * `Err` - If `path` is not inside a git repository
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| {
            ReleaseError::Git(git2::Error::from_str(&format!(
                "Not in a git repository ({}): {}",
                path.display(),
                e.message()
            )))
        })?;
        Ok(GitRepo { repo })
    }

    /// Stages every change in the working tree, like `git add -A`.
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        // add_all does not pick up deletions
        index.update_all(["*"], None)?;
        index.write()?;
        debug!("Staged all changes");
        Ok(())
    }

    /// Commits the current index on HEAD.
    ///
    /// Works on an unborn branch, creating the root commit.
    ///
    /// # Returns
    /// * `Ok(Oid)` - Id of the new commit
    /// * `Err` - If no signature is configured or the commit fails
    pub fn commit(&self, message: &str) -> Result<Oid> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        info!(commit = %oid, "Created release commit");
        Ok(oid)
    }

    /// Creates an annotated tag on the HEAD commit.
    ///
    /// Fails if the tag already exists.
    pub fn create_annotated_tag(&self, tag_name: &str, message: &str) -> Result<Oid> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;
        let oid = self
            .repo
            .tag(tag_name, head.as_object(), &signature, message, false)?;
        info!(tag = tag_name, "Created annotated tag");
        Ok(oid)
    }

    /// Short name of the checked-out branch.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::remote("HEAD is detached, cannot push a branch"));
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::remote("Branch name is not valid UTF-8"))
    }

    /// Pushes the current branch and a tag to a remote.
    ///
    /// Authenticates with SSH keys from `~/.ssh/`, the SSH agent, or the
    /// default credential helper.
    ///
    /// # Returns
    /// * `Ok(())` - Branch and tag pushed
    /// * `Err` - If the remote is missing or the push fails (network, auth, or rejected ref)
    pub fn push_release(&self, remote_name: &str, tag_name: &str) -> Result<()> {
        let branch = self.current_branch()?;
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| ReleaseError::remote(format!("No remote named '{}' found", remote_name)))?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }

                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Push rejected for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspecs = [
            format!("refs/heads/{0}:refs/heads/{0}", branch),
            format!("refs/tags/{0}:refs/tags/{0}", tag_name),
        ];

        remote
            .push(&refspecs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    ReleaseError::remote(format!("Network error during push: {}", e))
                }
                git2::ErrorClass::Reference => {
                    ReleaseError::remote(format!("Reference error during push: {}", e))
                }
                _ => ReleaseError::remote(format!(
                    "Failed to push {} and {} to '{}': {}",
                    branch, tag_name, remote_name, e
                )),
            })?;

        info!(remote = remote_name, branch = %branch, tag = tag_name, "Pushed release");
        Ok(())
    }
}
