//! Compiled-in permission codes and the bootstrap catalog.
//!
//! New codes are additive: append them here (ids are assigned in declaration
//! order at seed time) and never rename an existing one.

use crate::PermissionCode;

macro_rules! permission_codes {
    ($( $name:ident = $code:literal, $title:literal, $module:literal; )*) => {
        $( pub const $name: PermissionCode = PermissionCode::from_static($code); )*

        /// Bootstrap catalog rows: `(code, name, module)`.
        pub(crate) const SEED: &[(&str, &str, &str)] = &[ $( ($code, $title, $module), )* ];
    };
}

permission_codes! {
    SUPER_ADMIN = "admin.super_admin", "Super Admin Access", "admin";

    DASHBOARD_VIEW = "dashboard.view", "View Dashboard", "dashboard";

    USER_VIEW = "user.view", "View Users", "users";
    USER_CREATE = "user.create", "Create Users", "users";
    USER_EDIT = "user.edit", "Edit Users", "users";
    USER_DELETE = "user.delete", "Delete Users", "users";

    ROLE_VIEW = "role.view", "View Roles", "roles";
    ROLE_CREATE = "role.create", "Create Roles", "roles";
    ROLE_EDIT = "role.edit", "Edit Roles", "roles";
    ROLE_DELETE = "role.delete", "Delete Roles", "roles";

    SETTINGS_VIEW = "settings.view", "View Settings", "settings";
    SETTINGS_EDIT = "settings.edit", "Edit Settings", "settings";

    FEATURE_MANAGE = "feature.manage", "Manage Features", "settings";

    COMPANY_VIEW = "company.view", "View Companies", "company";
    COMPANY_CREATE = "company.create", "Create Companies", "company";
    COMPANY_EDIT = "company.edit", "Edit Companies", "company";
    COMPANY_DELETE = "company.delete", "Delete Companies", "company";

    BRANCH_VIEW = "branch.view", "View Branches", "branch";
    BRANCH_CREATE = "branch.create", "Create Branches", "branch";
    BRANCH_EDIT = "branch.edit", "Edit Branches", "branch";
    BRANCH_DELETE = "branch.delete", "Delete Branches", "branch";

    DEPARTMENT_VIEW = "department.view", "View Departments", "department";
    DEPARTMENT_CREATE = "department.create", "Create Departments", "department";
    DEPARTMENT_EDIT = "department.edit", "Edit Departments", "department";
    DEPARTMENT_DELETE = "department.delete", "Delete Departments", "department";

    DESIGNATION_VIEW = "designation.view", "View Designations", "designation";
    DESIGNATION_CREATE = "designation.create", "Create Designations", "designation";
    DESIGNATION_EDIT = "designation.edit", "Edit Designations", "designation";
    DESIGNATION_DELETE = "designation.delete", "Delete Designations", "designation";

    EMPLOYEE_VIEW = "employee.view", "View Own Profile", "employee";
    EMPLOYEE_VIEW_ALL = "employee.view_all", "View All Employees", "employee";
    EMPLOYEE_CREATE = "employee.create", "Create Employees", "employee";
    EMPLOYEE_EDIT = "employee.edit", "Edit Employees", "employee";
    EMPLOYEE_DELETE = "employee.delete", "Delete Employees", "employee";

    ATTENDANCE_VIEW = "attendance.view", "View Own Attendance", "attendance";
    ATTENDANCE_VIEW_ALL = "attendance.view_all", "View All Attendance", "attendance";
    ATTENDANCE_MARK = "attendance.mark", "Mark Attendance", "attendance";
    ATTENDANCE_EDIT = "attendance.edit", "Edit Attendance", "attendance";
    ATTENDANCE_APPROVE = "attendance.approve", "Approve Attendance", "attendance";

    LEAVE_VIEW = "leave.view", "View Own Leaves", "leave";
    LEAVE_VIEW_ALL = "leave.view_all", "View All Leaves", "leave";
    LEAVE_APPLY = "leave.apply", "Apply Leave", "leave";
    LEAVE_APPROVE = "leave.approve", "Approve Leave", "leave";
    LEAVE_CANCEL = "leave.cancel", "Cancel Leave", "leave";

    HOLIDAY_VIEW = "holiday.view", "View Holidays", "holiday";
    HOLIDAY_MANAGE = "holiday.manage", "Manage Holidays", "holiday";

    SHIFT_VIEW = "shift.view", "View Shifts", "shift";
    SHIFT_MANAGE = "shift.manage", "Manage Shifts", "shift";

    PAYROLL_VIEW = "payroll.view", "View Own Payslip", "payroll";
    PAYROLL_VIEW_ALL = "payroll.view_all", "View All Payroll", "payroll";
    PAYROLL_MANAGE = "payroll.manage", "Manage Payroll", "payroll";

    SALARY_VIEW = "salary.view", "View Own Salary", "salary";
    SALARY_VIEW_ALL = "salary.view_all", "View All Salaries", "salary";
    SALARY_CREATE = "salary.create", "Create Salary Structure", "salary";
    SALARY_EDIT = "salary.edit", "Edit Salary Structure", "salary";
    SALARY_DELETE = "salary.delete", "Delete Salary Structure", "salary";
    SALARY_APPROVE = "salary.approve", "Approve Salary/Payslip", "salary";

    PROJECT_VIEW = "project.view", "View Own Projects", "project";
    PROJECT_VIEW_ALL = "project.view_all", "View All Projects", "project";
    PROJECT_VIEW_OWN = "project.view_own", "View Assigned Projects (Client)", "project";
    PROJECT_CREATE = "project.create", "Create Projects", "project";
    PROJECT_EDIT = "project.edit", "Edit Projects", "project";
    PROJECT_DELETE = "project.delete", "Delete Projects", "project";

    TASK_VIEW = "task.view", "View Own Tasks", "task";
    TASK_VIEW_ALL = "task.view_all", "View All Tasks", "task";
    TASK_CREATE = "task.create", "Create Tasks", "task";
    TASK_EDIT = "task.edit", "Edit Tasks", "task";
    TASK_DELETE = "task.delete", "Delete Tasks", "task";
    TASK_ASSIGN = "task.assign", "Assign Tasks", "task";

    TEAM_VIEW = "team.view", "View Teams", "team";
    TEAM_CREATE = "team.create", "Create Teams", "team";
    TEAM_EDIT = "team.edit", "Edit Teams", "team";
    TEAM_DELETE = "team.delete", "Delete Teams", "team";
    TEAM_MANAGE_MEMBERS = "team.manage_members", "Manage Team Members", "team";

    CLIENT_VIEW = "client.view", "View Clients", "client";
    CLIENT_VIEW_OWN = "client.view_own", "View Own Client Profile", "client";
    CLIENT_CREATE = "client.create", "Create Clients", "client";
    CLIENT_EDIT = "client.edit", "Edit Clients", "client";
    CLIENT_DELETE = "client.delete", "Delete Clients", "client";

    LEAD_VIEW = "lead.view", "View Leads", "lead";
    LEAD_CREATE = "lead.create", "Create Leads", "lead";
    LEAD_EDIT = "lead.edit", "Edit Leads", "lead";
    LEAD_DELETE = "lead.delete", "Delete Leads", "lead";

    DEAL_VIEW = "deal.view", "View Deals", "deal";
    DEAL_CREATE = "deal.create", "Create Deals", "deal";
    DEAL_EDIT = "deal.edit", "Edit Deals", "deal";
    DEAL_DELETE = "deal.delete", "Delete Deals", "deal";

    INVOICE_VIEW = "invoice.view", "View Invoices", "invoice";
    INVOICE_VIEW_OWN = "invoice.view_own", "View Own Invoices", "invoice";
    INVOICE_CREATE = "invoice.create", "Create Invoices", "invoice";
    INVOICE_EDIT = "invoice.edit", "Edit Invoices", "invoice";
    INVOICE_DELETE = "invoice.delete", "Delete Invoices", "invoice";

    TIMESHEET_VIEW = "timesheet.view", "View Own Timesheets", "timesheet";
    TIMESHEET_VIEW_ALL = "timesheet.view_all", "View All Timesheets", "timesheet";
    TIMESHEET_CREATE = "timesheet.create", "Create Timesheets", "timesheet";
    TIMESHEET_APPROVE = "timesheet.approve", "Approve Timesheets", "timesheet";

    REPORT_VIEW = "report.view", "View Reports", "report";
    REPORT_EXPORT = "report.export", "Export Reports", "report";
    REPORT_CREATE = "report.create", "Create Reports", "report";

    AUDIT_VIEW = "audit.view", "View Audit Logs", "audit";

    META_VIEW = "meta.view", "View Meta Ads", "meta";
    META_MANAGE = "meta.manage", "Manage Meta Ads", "meta";

    BLOG_VIEW = "blog.view", "View Blog Posts", "blog";
    BLOG_CREATE = "blog.create", "Create Blog Posts", "blog";
    BLOG_EDIT = "blog.edit", "Edit Blog Posts", "blog";
    BLOG_DELETE = "blog.delete", "Delete Blog Posts", "blog";
}
