//! 新版本提示

use crate::backend::{EvidenceStore, SoftwareVersion};
use crate::error::{RsgResult, RsguessError};
use crate::utils::compare_versions;

/// 按版本号取最新版本
pub fn most_recent<'a, I>(versions: I) -> Option<&'a SoftwareVersion>
where
    I: IntoIterator<Item = &'a SoftwareVersion>,
{
    versions
        .into_iter()
        .max_by(|a, b| compare_versions(&a.name, &b.name))
}

/// 若证据库中存在比给定版本（取其中最新者）更新的版本，返回该最新版本
///
/// 给定版本必须属于同一个软件包。证据库中的版本不论是否已索引都参与比较。
pub fn more_recent_version<'a, I>(
    store: &dyn EvidenceStore,
    versions: I,
) -> RsgResult<Option<SoftwareVersion>>
where
    I: IntoIterator<Item = &'a SoftwareVersion>,
{
    let versions: Vec<&SoftwareVersion> = versions.into_iter().collect();
    let Some(first) = versions.first() else {
        return Err(RsguessError::InvalidInput("未提供任何版本".to_string()));
    };

    let package = &first.software_package;
    if versions.iter().any(|v| &v.software_package != package) {
        return Err(RsguessError::InvalidInput(format!(
            "版本不属于同一软件包：{}",
            versions.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
        )));
    }

    let Some(newest_given) = most_recent(versions.iter().copied()) else {
        return Ok(None);
    };
    let known = store.retrieve_versions(package, false)?;

    Ok(most_recent(&known)
        .filter(|newest| compare_versions(&newest.name, &newest_given.name).is_gt())
        .cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Entity, SoftwarePackage};
    use crate::test_support::{sample_store, version};

    #[test]
    fn test_more_recent_version() {
        let store = sample_store();

        let older = [version("WordPress", "5.4")];
        assert_eq!(
            more_recent_version(&store, &older).unwrap(),
            Some(version("WordPress", "5.5"))
        );

        let current = [version("WordPress", "5.4"), version("WordPress", "5.5")];
        assert_eq!(more_recent_version(&store, &current).unwrap(), None);

        // 未索引版本同样参与比较
        store
            .store(Entity::Version(SoftwareVersion::new(SoftwarePackage::new("WordPress"), "5.10")))
            .unwrap();
        assert_eq!(
            more_recent_version(&store, &current).unwrap(),
            Some(version("WordPress", "5.10"))
        );
    }

    #[test]
    fn test_mixed_packages_are_rejected() {
        let store = sample_store();
        let mixed = [version("WordPress", "5.4"), version("Drupal", "9.1")];

        assert!(matches!(
            more_recent_version(&store, &mixed),
            Err(RsguessError::InvalidInput(_))
        ));
        assert!(matches!(
            more_recent_version(&store, &Vec::<SoftwareVersion>::new()),
            Err(RsguessError::InvalidInput(_))
        ));
    }
}
