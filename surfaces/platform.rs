/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

/// Read-only view of the browser platform features the PWA phase checks.
pub trait PlatformCapabilities: Send + Sync {
    fn has_service_worker(&self) -> bool;
    /// A `<link rel="manifest">` element is present in the document.
    fn has_manifest_link(&self) -> bool;
    fn has_notification_api(&self) -> bool;
}
