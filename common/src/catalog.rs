/// Security event IDs worth extracting, with a short description.
///
/// Keys are compared as text, exactly as they appear in the `Id` property.
pub const EVENT_CATALOG: &[(&str, &str)] = &[
    ("4624", "Successful Logon"),
    ("4625", "Failed Logon"),
    ("4634", "Logoff"),
    ("4648", "Logon Attempt Using Explicit Credentials"),
    ("4663", "Object Access Attempt"),
    ("4672", "Special Privileges Assigned to New Logon"),
    ("4688", "Process Creation"),
    ("4697", "Service Installed"),
    ("4700", "Audit Policy Changed"),
    ("4720", "New User Created"),
    ("4722", "User Account Enabled"),
    ("4723", "Password Change Attempt"),
    ("4724", "Password Reset by Admin"),
    ("4725", "User Account Disabled"),
    ("4726", "User Account Deleted"),
    ("4732", "User Added to Group"),
    ("4733", "User Removed from Group"),
    ("4738", "User Account Changed"),
    ("4740", "User Account Locked Out"),
    ("4767", "Account Unlocked"),
    ("4768", "Kerberos Authentication Ticket Issued"),
    ("4776", "Credential Validation Attempt"),
    ("4778", "Session Reconnected"),
    ("4779", "Session Disconnected"),
    ("4781", "Group Membership Changed"),
    ("4798", "User’s Group Membership Queried"),
    (
        "4799",
        "A Security-enabled Global Group Membership Was Enumerated",
    ),
    ("5136", "Directory Service Object Modified"),
    ("5137", "Directory Service Object Created"),
    ("5138", "Directory Service Object Undeleted"),
    ("5140", "Network Share Accessed"),
    ("5141", "Directory Service Object Deleted"),
    ("5142", "Security Policy in Group Policy Object Changed"),
    ("5145", "Detailed File Share Access"),
    ("5156", "Windows Filtering Platform Connection Allowed"),
    ("5157", "Windows Filtering Platform Connection Blocked"),
    ("5379", "Logon with Explicit Credentials"),
    ("7045", "Service Installed on System"),
];

/// Returns the description of `event_id` if it is part of the catalog.
pub fn describe(event_id: &str) -> Option<&'static str> {
    EVENT_CATALOG
        .iter()
        .find(|(id, _)| *id == event_id)
        .map(|(_, description)| *description)
}
