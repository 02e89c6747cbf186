use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Builds the boot script handed to the instance: fetch the worker script
/// from object storage, mark it executable, and run it with the metadata
/// table name and the record id as its two positional arguments.
pub fn build_boot_script(script_path: &str, table_name: &str, id: &str) -> String {
    [
        "#!/bin/bash".to_string(),
        "cd /home/ec2-user".to_string(),
        format!("aws s3 cp {} script.sh", script_path),
        "sudo chmod +x script.sh".to_string(),
        format!("./script.sh {} {}", table_name, id),
    ]
    .join("\n")
}

/// RunInstances requires user data to be base64 encoded on the wire.
pub fn encode_user_data(script: &str) -> String {
    STANDARD.encode(script)
}
