use crate::domain::entities::Package;
use crate::domain::errors::InstallError;

pub struct PackageValidator;

impl PackageValidator {
    /// Names end up as file names under the local bin and share directories.
    pub fn validate_package_name(name: &str) -> bool {
        !name.trim().is_empty()
            && name != "."
            && name != ".."
            && !name.contains('/')
            && !name.chars().any(char::is_whitespace)
    }

    pub fn validate_package(package: &Package) -> Result<(), InstallError> {
        if !Self::validate_package_name(&package.name) {
            return Err(InstallError::InvalidPackage(format!(
                "invalid package name: {:?}",
                package.name
            )));
        }
        if package.source.trim().is_empty() {
            return Err(InstallError::InvalidPackage(format!(
                "package {} has an empty source",
                package.name
            )));
        }
        Ok(())
    }
}
